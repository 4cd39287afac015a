use crate::output::{print_json, print_table};
use deck_core::trigger::accelerators;

pub fn run(json: bool) -> anyhow::Result<()> {
    let table = accelerators();

    if json {
        let items: Vec<serde_json::Value> = table
            .iter()
            .map(|(button, accelerator)| {
                serde_json::json!({ "button": button, "accelerator": accelerator })
            })
            .collect();
        return print_json(&items);
    }

    let rows = table
        .into_iter()
        .map(|(button, accelerator)| vec![button.to_string(), accelerator])
        .collect();
    print_table(&["BUTTON", "ACCELERATOR"], rows);
    Ok(())
}
