//! `lucy memory`: show what Lucy remembers.

use lucy_memory::FactStore;

pub async fn show(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = FactStore::open(config.facts_path());

    if json {
        println!("{}", serde_json::to_string_pretty(store.recall_all())?);
        return Ok(());
    }

    println!("🧠 Lucy's Memory");
    println!("================");
    println!("  File:    {}", config.facts_path().display());
    println!("  Summary: {}", store.summary());

    for (category, facts) in store.recall_all() {
        if facts.is_empty() {
            continue;
        }
        println!();
        println!("  [{category}]");
        for (key, fact) in facts {
            println!(
                "    {key}: {} (mentioned {}x, {})",
                fact.value,
                fact.mentions,
                fact.learned_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    let conversations = config.conversations_dir();
    let saved = std::fs::read_dir(&conversations)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                .count()
        })
        .unwrap_or(0);
    println!();
    println!("  Saved conversations: {saved} in {}", conversations.display());

    Ok(())
}
