//! `groundrag config`: configuration management commands.

use groundrag_config::AppConfig;

const REDACTED: &str = "***";

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    };
    println!("   ✅ Config parsed successfully");

    let warnings = warnings(&config);
    if warnings.is_empty() {
        println!("   ✅ All checks passed");
    } else {
        println!();
        for w in &warnings {
            println!("   ⚠️  {w}");
        }
    }

    println!();
    println!("   Answering:  {} / {}", config.core_provider(), config.core.model);
    println!(
        "   Relevancy:  {} / {} (threshold {})",
        config.judge_provider(&config.pre_filter),
        config.judge_model(&config.pre_filter),
        config.pre_filter.threshold
    );
    println!(
        "   Grounding:  {} / {} (threshold {})",
        config.judge_provider(&config.post_filter),
        config.judge_model(&config.post_filter),
        config.post_filter.threshold
    );
    println!(
        "   Retrieval:  last {} turns, top {} documents",
        config.retrieval.history_window, config.retrieval.top_k
    );
    match &config.knowledge.documents_dir {
        Some(dir) => println!("   Documents:  {dir}"),
        None => println!("   Documents:  (none)"),
    }

    Ok(())
}

/// Settings that are valid but probably not what the user wants.
fn warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.has_api_key() {
        warnings.push(
            "No API key set (set GROUNDRAG_API_KEY, OPENROUTER_API_KEY or OPENAI_API_KEY)".to_string(),
        );
    }
    if config.knowledge.documents_dir.is_none() {
        warnings.push("No knowledge.documents_dir; pass --docs or every answer will lack context".to_string());
    }
    if config.pre_filter.temperature > 0.0 || config.post_filter.temperature > 0.0 {
        warnings.push("Judge temperature above 0 makes verdicts non-deterministic".to_string());
    }
    if config.retrieval.history_window == 0 {
        warnings.push("retrieval.history_window = 0 disables conversational context".to_string());
    }

    warnings
}

/// A copy of `config` safe to print.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut config = config.clone();
    if config.api_key.is_some() {
        config.api_key = Some(REDACTED.to_string());
    }
    for provider in config.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.to_string());
        }
    }
    config
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&redacted(&config))?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_hides_every_key() {
        let config = AppConfig::from_toml_str(
            "api_key = \"sk-top\"\n[providers.openai]\napi_key = \"sk-nested\"\n",
        )
        .unwrap();
        let shown = toml::to_string_pretty(&redacted(&config)).unwrap();
        assert!(!shown.contains("sk-top"));
        assert!(!shown.contains("sk-nested"));
        assert!(shown.contains(REDACTED));
    }

    #[test]
    fn defaults_warn_about_missing_key_and_documents() {
        let warnings = warnings(&AppConfig::default());
        assert!(warnings.iter().any(|w| w.contains("API key")));
        assert!(warnings.iter().any(|w| w.contains("documents_dir")));
    }
}
