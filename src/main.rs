use stash_db_module::{StashColumn, StashDb, StashValue};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "stash.redb".to_string());
    let db = StashDb::new(&path)?;
    let column = StashColumn::default();

    column.on_create(&db, "player1")?;
    let stash = column.controller(&db, "player1")?;

    stash.set("sports/baseball/stats/RBIs", 4i64)?;
    print_document("after set", &stash.document()?.unwrap_or_default());

    let rbis = stash.increment_by_one("sports/baseball/stats/RBIs")?;
    println!("increment -> {}", serde_json::Value::from(rbis));

    let removed = stash.delete("sports/baseball/stats/RBIs")?;
    println!(
        "delete -> {}",
        serde_json::Value::from(removed.unwrap_or_default())
    );
    print_document("after delete", &stash.document()?.unwrap_or_default());

    println!("version {}", stash.version()?.0);
    Ok(())
}

fn print_document(label: &str, doc: &stash_db_module::Document) {
    let json = serde_json::Value::from(StashValue::Object(doc.clone()));
    println!("{label}: {json}");
}
