use serde::Serialize;

use cabinet_core::types::CheckResult;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Cross-check results as an aligned table. Details are the last column and
/// are never padded, so long ministry messages do not widen the layout.
pub fn render_checks(results: &[CheckResult]) -> String {
    const HEADERS: [&str; 2] = ["MINISTRY", "RESULT"];

    let outcome = |c: &CheckResult| if c.cleared { "cleared" } else { "flagged" };
    let ministry_width = results
        .iter()
        .map(|c| c.ministry.as_str().len())
        .fold(HEADERS[0].len(), usize::max);
    let result_width = results
        .iter()
        .map(|c| outcome(c).len())
        .fold(HEADERS[1].len(), usize::max);

    let mut out = format!(
        "{:ministry_width$}  {:result_width$}  DETAILS\n",
        HEADERS[0], HEADERS[1]
    );
    out.push_str(&format!(
        "{}  {}  -------\n",
        "-".repeat(ministry_width),
        "-".repeat(result_width)
    ));
    for c in results {
        out.push_str(&format!(
            "{:ministry_width$}  {:result_width$}  {}\n",
            c.ministry.as_str(),
            outcome(c),
            c.details
        ));
    }
    out
}

pub fn print_checks(results: &[CheckResult]) {
    print!("{}", render_checks(results));
}
