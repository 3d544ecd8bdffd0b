//! Layering of YAML configuration values.
//!
//! `config.local.yml` is laid over `config.yml`:
//!
//! - Mappings merge key by key
//! - Sequences are replaced wholesale
//! - A null in the overlay removes the key
//! - Any other overlay value wins

use serde_yaml::Value;

/// Lay `overlay` over `base`.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let (Value::Mapping(base_map), Value::Mapping(overlay_map)) = (base, overlay) else {
        return overlay.clone();
    };

    let mut merged = base_map.clone();
    for (key, value) in overlay_map {
        if value.is_null() {
            merged.remove(key);
            continue;
        }
        let layered = match base_map.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), layered);
    }
    Value::Mapping(merged)
}

/// Merge config documents in order; the last one has the final say.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .fold(Value::Mapping(Default::default()), |acc, config| {
            deep_merge(&acc, config)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn command_override_keeps_sibling_fields() {
        let base = yaml(
            r#"
commands:
  deploy_app:
    run: ./deploy.sh
    cwd: app
"#,
        );
        let overlay = yaml(
            r#"
commands:
  deploy_app:
    run: make deploy
"#,
        );

        let merged = deep_merge(&base, &overlay);

        assert_eq!(merged["commands"]["deploy_app"]["run"], "make deploy");
        assert_eq!(merged["commands"]["deploy_app"]["cwd"], "app");
    }

    #[test]
    fn sequences_are_replaced() {
        let merged = deep_merge(
            &yaml("requires: [databricks, uv, bun]"),
            &yaml("requires: [uv]"),
        );
        let requires = merged["requires"].as_sequence().unwrap();
        assert_eq!(requires.len(), 1);
        assert_eq!(requires[0], "uv");
    }

    #[test]
    fn null_removes_key() {
        let merged = deep_merge(
            &yaml("defaults:\n  PROMPT_NAME: a\n  PROMPT_ALIAS: b\n"),
            &yaml("defaults:\n  PROMPT_NAME: null\n"),
        );
        assert!(merged["defaults"].get("PROMPT_NAME").is_none());
        assert_eq!(merged["defaults"]["PROMPT_ALIAS"], "b");
    }

    #[test]
    fn scalar_replaces_mapping() {
        let merged = deep_merge(&yaml("detect:\n  HOST:\n    run: x\n"), &yaml("detect: off"));
        assert_eq!(merged["detect"], "off");
    }

    #[test]
    fn empty_overlay_is_identity() {
        let base = yaml("app_name: demo\nenv_file: .env");
        assert_eq!(deep_merge(&base, &yaml("{}")), base);
    }

    #[test]
    fn later_documents_win() {
        let merged = merge_configs(&[yaml("a: 1\nb: 2"), yaml("b: 3\nc: 4"), yaml("c: 5")]);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 3);
        assert_eq!(merged["c"], 5);
    }

    #[test]
    fn no_documents_is_empty_mapping() {
        assert!(merge_configs(&[]).as_mapping().unwrap().is_empty());
    }
}
