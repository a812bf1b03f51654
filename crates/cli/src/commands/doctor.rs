//! `groundrag doctor`: diagnose configuration and provider health.

use std::path::Path;

use groundrag_config::AppConfig;
use groundrag_core::Provider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 groundrag doctor");
    println!("===================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  ✅ Config file found at {}", config_path.display());
    } else {
        println!("  ⚠️  No config file at {}, using defaults", config_path.display());
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue found. Fix the config and run again.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured; add api_key to config.toml or set OPENROUTER_API_KEY");
        issues += 1;
    }

    match &config.knowledge.documents_dir {
        Some(dir) if Path::new(dir).is_dir() => println!("  ✅ Documents directory {dir}"),
        Some(dir) => {
            println!("  ❌ Documents directory {dir} does not exist");
            issues += 1;
        }
        None => println!("  ⚠️  No documents directory configured; use --docs"),
    }

    match groundrag_providers::build_from_config(&config) {
        Ok(router) => {
            for name in router.list() {
                let Some(provider) = router.get(name) else {
                    continue;
                };
                match provider.health_check().await {
                    Ok(true) => {
                        println!("  ✅ Provider {name} reachable");
                        issues += check_models(&config, name, provider.as_ref()).await;
                    }
                    Ok(false) => {
                        println!("  ❌ Provider {name} unhealthy");
                        issues += 1;
                    }
                    Err(e) => {
                        println!("  ❌ Provider {name}: {e}");
                        issues += 1;
                    }
                }
            }
        }
        Err(e) => {
            println!("  ❌ Providers: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Models each configured role expects from `provider`.
fn expected_models<'a>(config: &'a AppConfig, provider: &str) -> Vec<&'a str> {
    let mut models = Vec::new();
    if config.core_provider() == provider {
        models.push(config.core.model.as_str());
        if let Some(embedding) = &config.knowledge.embedding_model {
            models.push(embedding.as_str());
        }
    }
    for judge in [&config.pre_filter, &config.post_filter] {
        if config.judge_provider(judge) == provider {
            models.push(config.judge_model(judge));
        }
    }
    models.sort_unstable();
    models.dedup();
    models
}

/// Expected models the provider does not list. An empty listing proves nothing.
fn missing_models<'a>(expected: &[&'a str], offered: &[String]) -> Vec<&'a str> {
    if offered.is_empty() {
        return Vec::new();
    }
    expected
        .iter()
        .copied()
        .filter(|model| !offered.iter().any(|o| o == model))
        .collect()
}

async fn check_models(config: &AppConfig, name: &str, provider: &dyn Provider) -> usize {
    let expected = expected_models(config, name);
    if expected.is_empty() {
        return 0;
    }
    match provider.list_models().await {
        Ok(offered) => {
            let missing = missing_models(&expected, &offered);
            for model in &missing {
                println!("  ❌ Provider {name} does not offer model {model}");
            }
            if missing.is_empty() && !offered.is_empty() {
                println!("  ✅ Provider {name} offers {}", expected.join(", "));
            }
            missing.len()
        }
        Err(e) => {
            println!("  ⚠️  Provider {name}: could not list models ({e})");
            0
        }
    }
}
