//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources merge in order: YAML file (if attached), then `PULSE__`-prefixed
//! environment variables. `${VAR}` placeholders anywhere in the merged tree
//! are expanded recursively before the typed structs materialise, so
//! credentials can live in the environment while the file stays committed.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct PulseConfig {
    pub llm: LlmConfig,
    #[serde(default)]
    pub brief: BriefConfig,
}

/// The tag is `provider`; only the Grok chat-completions backend exists
/// today.
#[derive(Debug, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    Grok {
        api_key: String,
        #[serde(default)]
        model: Option<String>,
        #[serde(default = "default_grok_endpoint")]
        endpoint: String,
    },
}

/// Request-shaping defaults for the briefing pipeline.
#[derive(Debug, Deserialize)]
pub struct BriefConfig {
    #[serde(default = "default_max_tweets")]
    pub max_tweets: usize,
    /// Executive-briefing scope; empty means the built-in default list.
    #[serde(default)]
    pub countries: Vec<String>,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            max_tweets: default_max_tweets(),
            countries: Vec::new(),
        }
    }
}

fn default_grok_endpoint() -> String {
    "https://api.x.ai/v1/".into()
}
fn default_max_tweets() -> usize {
    5
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct PulseConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PulseConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseConfigLoader {
    /// Start with sensible defaults: `PULSE__` env overrides, nothing else.
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("PULSE").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers the format by suffix.
    /// Missing files are tolerated so deployments can be env-only.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use pulse_config::{LlmConfig, PulseConfigLoader};
    ///
    /// let cfg = PulseConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   provider: "grok"
    ///   api_key: "xai-demo"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// let LlmConfig::Grok { api_key, endpoint, .. } = cfg.llm;
    /// assert_eq!(api_key, "xai-demo");
    /// assert_eq!(endpoint, "https://api.x.ai/v1/");
    /// assert_eq!(cfg.brief.max_tweets, 5);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config, expanding `${VAR}` placeholders along the way.
    pub fn load(self) -> Result<PulseConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: PulseConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Doha")), ("CC", Some("QA"))], || {
            let mut v = json!(["hello-$CITY", { "loc": "${CITY}-${CC}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(v, json!(["hello-Doha", { "loc": "Doha-QA" }, 42, true, null]));
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles_and_terminates() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn api_key_is_injected_from_environment() {
        temp_env::with_var("GROK_API_KEY", Some("xai-secret"), || {
            let cfg = PulseConfigLoader::new()
                .with_yaml_str(
                    r#"
llm:
  provider: "grok"
  api_key: "${GROK_API_KEY}"
  model: "grok-3"
brief:
  max_tweets: 8
  countries: ["Qatar", "Oman"]
"#,
                )
                .load()
                .expect("valid configuration");

            let LlmConfig::Grok { api_key, model, .. } = cfg.llm;
            assert_eq!(api_key, "xai-secret");
            assert_eq!(model.as_deref(), Some("grok-3"));
            assert_eq!(cfg.brief.max_tweets, 8);
            assert_eq!(cfg.brief.countries, vec!["Qatar", "Oman"]);
        });
    }
}
