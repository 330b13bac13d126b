use super::{frequency::FrequencyMap, peaks::PeakSet, RegistrationStats};

/// Day-of-week names indexed Sunday = 0.
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn day_name(day: u32) -> Option<&'static str> {
    DAY_NAMES.get(day as usize).copied()
}

fn join_keys<F: Fn(&u32) -> String>(peaks: &PeakSet<u32>, label: F) -> String {
    let mut keys = peaks.keys().to_vec();
    keys.sort_unstable();
    keys.iter().map(label).collect::<Vec<_>>().join(", ")
}

fn day_label(day: &u32, names: &[&str; 7]) -> String {
    names
        .get(*day as usize)
        .map(|n| n.to_string())
        .unwrap_or_else(|| format!("Day {}", day))
}

fn write_counts<F: Fn(&u32) -> String>(out: &mut String, counts: &FrequencyMap<u32>, label: F) {
    for (key, count) in counts.iter() {
        out.push_str(&format!("{}: {} registrations\n", label(key), count));
    }
}

/// Render hour and day statistics as plain text, counts ascending by key and
/// days spelled out through `day_names`.
pub fn render_statistics(stats: &RegistrationStats, day_names: &[&str; 7]) -> String {
    let mut out = String::new();

    out.push_str("\nRegistration hour statistics:\n");
    write_counts(&mut out, &stats.hour_counts, |h| format!("Hour {}", h));
    out.push_str(&format!(
        "\nPeak registration hour(s): {}\n",
        join_keys(&stats.peak_hours, |h| h.to_string())
    ));

    out.push_str("\nRegistration day statistics:\n");
    write_counts(&mut out, &stats.day_counts, |d| day_label(d, day_names));
    out.push_str(&format!(
        "\nPeak registration day(s): {}\n",
        join_keys(&stats.peak_days, |d| day_label(d, day_names))
    ));

    if stats.skipped > 0 {
        out.push_str(&format!(
            "\n({} registrations skipped: unreadable timestamp)\n",
            stats.skipped
        ));
    }

    out
}
