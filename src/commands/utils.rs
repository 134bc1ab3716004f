use crate::utils::config::{API_PREFIX, COUNT_KEY, DATA_KEY};

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Facet Aggregator Schema");
    println!("API: {}/buffered, {}/streaming", API_PREFIX, API_PREFIX);
    println!();

    if show_details {
        println!("Input:");
        println!("  {}: object              - Top-level facets by name", DATA_KEY);
        println!("    <name>: object         - Interior facet (nested facets by name)");
        println!("    <name>: object         - Leaf facet, exactly {{\"{}\": number}}", COUNT_KEY);
        println!();
        println!("Output:");
        println!("  result: array            - One entry per distinct facet name");
        println!("    {{<name>: number}}       - Sum of every leaf count beneath the name");
        println!();
        println!("Entries are sorted by name (byte order). Repeated names are summed.");
        println!();
        println!("Errors:");
        println!("  {{\"status_code\": number, \"error\": string}}");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Facet Aggregator v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Aggregates nested facet counts into sorted per-facet totals.");
}
