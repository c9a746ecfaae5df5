//! `lucy doctor`: diagnose the local setup.

use lucy_config::AppConfig;
use lucy_core::face::{FaceNotifier, FaceState};
use lucy_face::TcpFaceNotifier;
use lucy_memory::FactStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Lucy Doctor: System Diagnostics");
    println!("==================================\n");

    let mut issues = 0;

    let config = match AppConfig::load() {
        Ok((config, Some(path))) => {
            println!("  ✅ Config loaded from {}", path.display());
            config
        }
        Ok((config, None)) => {
            println!("  ⚠️  No config file found, using defaults");
            println!("     Looked in:");
            for candidate in AppConfig::candidate_paths() {
                println!("       {}", candidate.display());
            }
            issues += 1;
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            return Err(e.into());
        }
    };

    // Backend
    let provider = super::provider(&config);
    match provider.list_models().await {
        Ok(models) if models.iter().any(|m| m == &config.chat_model) => {
            println!("  ✅ Backend reachable at {} (model {} available)", config.api_base, config.chat_model);
        }
        Ok(models) => {
            println!("  ⚠️  Backend reachable but model '{}' not listed", config.chat_model);
            if !models.is_empty() {
                println!("     Available: {}", models.join(", "));
            }
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Backend not reachable at {}: {e}", config.api_base);
            issues += 1;
        }
    }

    // Prompt
    if config.prompt_path.exists() {
        println!("  ✅ Prompt file {}", config.prompt_path.display());
    } else {
        println!("  ⚠️  Prompt file {} missing, using built-in prompt", config.prompt_path.display());
        issues += 1;
    }

    // Memory
    let facts = FactStore::open(config.facts_path());
    println!("  ✅ Memory at {} ({})", config.memory_path.display(), facts.summary());

    // Data root and database for the tools
    if config.data_root.is_dir() {
        println!("  ✅ Data root {}", config.data_root.display());
    } else {
        println!("  ⚠️  Data root {} does not exist", config.data_root.display());
        issues += 1;
    }
    if config.database_path.exists() {
        println!("  ✅ Database {}", config.database_path.display());
    } else {
        println!("  ⚠️  Database {} not found (query_db will fail)", config.database_path.display());
        issues += 1;
    }

    // Face
    if config.face.enabled {
        let face = TcpFaceNotifier::from_config(&config.face);
        if face.set(FaceState::IDLE).await {
            println!("  ✅ Face renderer listening on {}", face.address());
        } else {
            println!("  ⚠️  Face renderer not reachable on {}", face.address());
            issues += 1;
        }
    } else {
        println!("  ➖ Face disabled");
    }

    // Extension tools
    if config.extensions.enabled {
        match lucy_tools::probe_gateway_tools(&config.extensions).await {
            Some(tools) => println!("  ✅ Extension gateway online ({} tools)", tools.len()),
            None => {
                println!("  ⚠️  Extension gateway not reachable at {}", config.extensions.gateway_url);
                issues += 1;
            }
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
