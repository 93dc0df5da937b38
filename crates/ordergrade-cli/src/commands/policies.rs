//! The `ordergrade policies` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use ordergrade_core::policy::GradingPolicy;

pub fn execute() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Code", "Name", "Description"]);

    for policy in GradingPolicy::ALL {
        table.add_row(vec![
            Cell::new(policy.code()),
            Cell::new(policy.name()),
            Cell::new(policy.description()),
        ]);
    }

    println!("{table}");
    Ok(())
}
