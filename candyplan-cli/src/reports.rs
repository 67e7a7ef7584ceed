use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use candyplan_core::{LevelPlan, PlanInput};

#[derive(Serialize)]
struct JsonReport<'a> {
    input: &'a PlanInput,
    plan: &'a LevelPlan,
}

/// Format `value` with comma thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn boost_label(input: &PlanInput) -> String {
    match (input.boost.full, input.boost.mini) {
        (Some(full), _) if full > 0 => format!("full x{full}"),
        (_, Some(mini)) if mini > 0 => format!("mini x{mini}"),
        _ => "none".to_string(),
    }
}

pub fn generate_console_report<W: Write>(
    writer: &mut W,
    input: &PlanInput,
    plan: &LevelPlan,
) -> Result<()> {
    writeln!(
        writer,
        "Lv{} -> Lv{} | track {} | nature {} | boost {}",
        input.lv_now,
        input.lv_target,
        input.track,
        input.nature,
        boost_label(input)
    )?;
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Requirements".bright_yellow().bold())?;
    writeln!(writer, "{}", "---------------".yellow())?;
    writeln!(writer, "Total EXP:          {}", group_thousands(plan.total_exp))?;
    writeln!(
        writer,
        "EXP after progress: {}",
        group_thousands(plan.remaining_exp)
    )?;
    if plan.passive_exp > 0 {
        writeln!(
            writer,
            "Passive EXP:        {}",
            group_thousands(plan.passive_exp).green()
        )?;
    }
    writeln!(
        writer,
        "Candies:            {}",
        group_thousands(plan.candies_total).bold()
    )?;
    writeln!(
        writer,
        "Candies to gather:  {}",
        group_thousands(plan.candies_needed).bright_magenta().bold()
    )?;
    writeln!(
        writer,
        "Shards:             {}",
        group_thousands(plan.shards_total).bright_cyan().bold()
    )?;
    if plan.boosted_candies > 0 {
        writeln!(
            writer,
            "Boosted candies:    {}",
            group_thousands(plan.boosted_candies)
        )?;
    }

    if !plan.steps.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "{}", "🪜 Per-level breakdown".bright_blue().bold())?;
        writeln!(writer, "{}", "----------------------".blue())?;
        writeln!(
            writer,
            "{:>5} {:>7} {:>7} {:>7} {:>7} {:>8} {:>7}",
            "Lv", "need", "banked", "candy", "boost", "shards", "carry"
        )?;
        for step in &plan.steps {
            writeln!(
                writer,
                "{:>5} {:>7} {:>7} {:>7} {:>7} {:>8} {:>7}",
                step.to_level,
                step.need,
                step.banked_in,
                step.candies,
                step.boosted,
                step.shards,
                step.carry_out
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write>(
    writer: &mut W,
    input: &PlanInput,
    plan: &LevelPlan,
) -> Result<()> {
    let report = JsonReport { input, plan };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(
    writer: &mut W,
    input: &PlanInput,
    plan: &LevelPlan,
) -> Result<()> {
    writeln!(
        writer,
        "# Level Plan: Lv{} → Lv{}\n",
        input.lv_now, input.lv_target
    )?;
    writeln!(writer, "- **Track**: {}", input.track)?;
    writeln!(writer, "- **Nature**: {}", input.nature)?;
    writeln!(writer, "- **Boost**: {}\n", boost_label(input))?;

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "| Figure | Value |")?;
    writeln!(writer, "|---|---:|")?;
    let rows = [
        ("Total EXP", plan.total_exp),
        ("EXP after progress", plan.remaining_exp),
        ("Passive EXP", plan.passive_exp),
        ("Candies", plan.candies_total),
        ("Candies to gather", plan.candies_needed),
        ("Shards", plan.shards_total),
        ("Boosted candies", plan.boosted_candies),
    ];
    for (label, value) in rows {
        writeln!(writer, "| {label} | {} |", group_thousands(value))?;
    }

    if !plan.steps.is_empty() {
        writeln!(writer, "\n## Breakdown\n")?;
        writeln!(writer, "| Lv | Need | Banked | Candies | Boosted | Shards | Carry |")?;
        writeln!(writer, "|---:|---:|---:|---:|---:|---:|---:|")?;
        for step in &plan.steps {
            writeln!(
                writer,
                "| {} | {} | {} | {} | {} | {} | {} |",
                step.to_level,
                step.need,
                step.banked_in,
                step.candies,
                step.boosted,
                step.shards,
                step.carry_out
            )?;
        }
    }
    Ok(())
}
