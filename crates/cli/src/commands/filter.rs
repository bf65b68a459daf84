//! `ledgerchat filter`: Evaluate a filter expression without the model.

use ledgerchat_pipeline::serialize_rows;

pub async fn run(expression: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let ledger = super::load_ledger(&config)?;

    let matched = ledgerchat_filter::execute(&ledger, &expression)
        .map_err(|e| format!("Invalid filter '{expression}': {e}"))?;
    let rows = serialize_rows(&matched, config.query.max_results);

    let output = serde_json::json!({
        "filter": expression.trim(),
        "matched": matched.len(),
        "results": rows,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
