use hohstartup_core::{Config, Paths};
use serde_json::Value;

const PASSWORD_KEY: &str = "password";

/// Show the current configuration as pretty-printed JSON.
pub async fn show() -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let mut json = serde_json::to_value(&config)?;
    if json.get(PASSWORD_KEY).is_some_and(|v| !v.is_null()) {
        json[PASSWORD_KEY] = Value::String("********".to_string());
    }

    println!();
    println!("📋 Current Configuration");
    println!("  File: {}", paths.config_file().display());
    println!();
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Get a config value by dot-separated key path.
pub async fn get(key: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let json = serde_json::to_value(&config)?;

    match key_pointer(&json, key).and_then(|p| json.pointer(&p)) {
        Some(Value::String(s)) => println!("{}", s),
        Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
        None => {
            eprintln!("Key '{}' not found in config.", key);
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Set a config value by dot-separated key path. Only keys the config
/// already has can be set.
pub async fn set(key: &str, value: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let mut json = serde_json::to_value(&config)?;

    // Try to parse value as JSON, fall back to string
    let parsed: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    replace_at(&mut json, key, parsed.clone())?;

    let new_config: Config = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for '{}': {}", key, e))?;
    new_config.save(&paths.config_file())?;

    if key == PASSWORD_KEY {
        println!("✓ Set {}", key);
    } else if let Value::String(s) = &parsed {
        println!("✓ Set {} = {}", key, s);
    } else {
        println!("✓ Set {} = {}", key, serde_json::to_string(&parsed)?);
    }
    Ok(())
}

/// Map a dot-separated key onto a JSON pointer into `json`. Each segment
/// may be camelCase or snake_case and must name an existing field.
fn key_pointer(json: &Value, key: &str) -> Option<String> {
    let mut pointer = String::new();
    let mut current = json;
    for segment in key.split('.') {
        let fields = current.as_object()?;
        let camel = to_camel_case(segment);
        let (name, next) = fields
            .get_key_value(&camel)
            .or_else(|| fields.get_key_value(segment))?;
        pointer.push('/');
        pointer.push_str(name);
        current = next;
    }
    Some(pointer)
}

fn replace_at(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let pointer = key_pointer(json, key)
        .ok_or_else(|| anyhow::anyhow!("Unknown config key '{}'", key))?;
    if let Some(slot) = json.pointer_mut(&pointer) {
        *slot = value;
    }
    Ok(())
}

/// Convert snake_case to camelCase.
fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for ch in s.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(ch.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
