use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::CareerReport;

fn success_rate(reports: &[CareerReport]) -> f64 {
    if reports.is_empty() {
        return 0.0;
    }
    let passed = reports.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = passed as f64 / reports.len() as f64 * 100.0;
    rate
}

pub fn generate_console_report(
    out: &mut dyn Write,
    reports: &[CareerReport],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Career Run Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=====================".cyan())?;

    let passed = reports.iter().filter(|r| r.passed).count();
    let failed = reports.len() - passed;
    writeln!(out, "Total careers: {}", reports.len())?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", failed.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(reports))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for report in reports {
        let status = if report.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} seed {}",
            status,
            report.style.bold(),
            report.seed
        )?;
        writeln!(
            out,
            "   Races: {} | Wins: {} | Podiums: {} | DOTD: {} | Stops: {}",
            report.races, report.wins, report.podiums, report.driver_of_the_day, report.pit_stops
        )?;
        writeln!(out, "   Season points: {:?}", report.season_points)?;
        if !report.trophies.is_empty() {
            writeln!(out, "   Trophies: {}", report.trophies.join(", "))?;
        }
        writeln!(
            out,
            "   Final budget: {:.0} ({})",
            report.final_budget, report.final_tier
        )?;
        for violation in &report.violations {
            writeln!(out, "     • {}", violation.red())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, reports: &[CareerReport]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(reports)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, reports: &[CareerReport]) -> Result<()> {
    writeln!(out, "# Apex Career Run Results\n")?;

    let passed = reports.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total careers**: {}", reports.len())?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", reports.len() - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(reports))?;

    writeln!(out, "## Careers\n")?;
    writeln!(out, "| Style | Seed | Races | Wins | Podiums | Season points | Trophies |")?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for report in reports {
        let status = if report.passed { "✅" } else { "❌" };
        let points: Vec<String> = report.season_points.iter().map(u32::to_string).collect();
        writeln!(
            out,
            "| {status} {} | {} | {} | {} | {} | {} | {} |",
            report.style,
            report.seed,
            report.races,
            report.wins,
            report.podiums,
            points.join(" / "),
            report.trophies.len()
        )?;
    }

    let failures: Vec<&CareerReport> = reports.iter().filter(|r| !r.passed).collect();
    if !failures.is_empty() {
        writeln!(out, "\n## Violations\n")?;
        for report in failures {
            writeln!(out, "### {} seed {}\n", report.style, report.seed)?;
            for violation in &report.violations {
                writeln!(out, "- {violation}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(passed: bool) -> CareerReport {
        CareerReport {
            seed: 9,
            style: "Balanced".into(),
            seasons: 1,
            races: 24,
            wins: 3,
            podiums: 8,
            pit_stops: 20,
            driver_of_the_day: 2,
            season_points: vec![212],
            trophies: vec!["WCC_2024".into()],
            final_budget: 812_000.0,
            final_tier: "R4".into(),
            violations: if passed {
                Vec::new()
            } else {
                vec!["race 4: duplicate trophy WDC_2024".into()]
            },
            passed,
            duration_ms: 12,
        }
    }

    #[test]
    fn markdown_lists_violations() {
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &[report(true), report(false)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("**Success rate**: 50.0%"));
        assert!(text.contains("## Violations"));
        assert!(text.contains("duplicate trophy WDC_2024"));
    }

    #[test]
    fn json_round_trips() {
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &[report(true)]).unwrap();
        let parsed: Vec<CareerReport> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].season_points, vec![212]);
    }
}
