//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# ragline configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# Secrets are best left to GEMINI_API_KEY / MISTRAL_API_KEY (or a .env file).

[gemini]
# api_key = "..."            # falls back to GEMINI_API_KEY
# model = "gemini-pro"       # gemini-pro, gemini-pro-vision, embedding-001, aqa
# temperature = 0.9          # 0.0-2.0, falls back to GEMINI_TEMPERATURE
# top_p = 1.0                # 0.0-1.0, falls back to GEMINI_TOP_P
# max_tokens = 1024          # falls back to GEMINI_MAX_TOKENS
streaming = true
# base_url = "https://generativelanguage.googleapis.com/v1beta"

[mistral]
# api_key = "..."            # falls back to MISTRAL_API_KEY
model = "mistral-embed"
# base_url = "https://api.mistral.ai"

[rag]
document = "data/abramov.txt"
query = "What did the author do in college?"
similarity_top_k = 2         # 1-20
max_node_chars = 2000        # 200-20000

[logging]
level = "INFO"               # TRACE, DEBUG, INFO, WARNING, ERROR
"##
}
