/// Template handed to yt-dlp's `--progress-template`; keep in sync with the
/// parser below.
pub const PROGRESS_TEMPLATE: &str = "progress:%(progress._percent_str)s|%(progress._speed_str)s";

const PROGRESS_PREFIX: &str = "progress:";

/// Parses one templated stdout line into (fraction, speed). Lines that don't
/// match the template (merge chatter, warnings) yield `None`.
pub fn parse_progress_from_line(line: &str) -> Option<(f32, Option<String>)> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let (percent_part, speed_part) = match rest.split_once('|') {
        Some((p, s)) => (p, Some(s)),
        None => (rest, None),
    };

    let number = percent_part.trim().strip_suffix('%')?;
    let fraction = number.trim().parse::<f32>().ok()? / 100.0;

    let speed = speed_part
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.contains("Unknown") && *s != "N/A")
        .map(str::to_string);

    Some((fraction, speed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_percent_and_speed() {
        let (fraction, speed) =
            parse_progress_from_line("progress:  42.5%| 3.21MiB/s").expect("template line");
        assert!((fraction - 0.425).abs() < 1e-6);
        assert_eq!(speed.as_deref(), Some("3.21MiB/s"));
    }

    #[test]
    fn unknown_speed_is_dropped() {
        let (fraction, speed) =
            parse_progress_from_line("progress: 100.0%|Unknown B/s").expect("template line");
        assert_eq!(fraction, 1.0);
        assert!(speed.is_none());
    }

    #[test]
    fn tolerates_a_missing_speed_field() {
        let (fraction, speed) = parse_progress_from_line("progress: 7.2%").expect("template line");
        assert!((fraction - 0.072).abs() < 1e-6);
        assert!(speed.is_none());
    }

    #[test]
    fn ignores_non_template_lines() {
        assert_eq!(parse_progress_from_line("[download] Destination: a.mp4"), None);
        assert_eq!(parse_progress_from_line("progress:garbage|1MiB/s"), None);
        assert_eq!(parse_progress_from_line(""), None);
    }
}
