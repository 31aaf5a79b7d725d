use chrono::{DateTime, FixedOffset, Utc};
use clap::Parser;
use horae::snapshot::{BodyReport, DailySnapshot, Reading};
use horae::{
    parse_instant, Almanac, AlmanacSettings, AlmanacSource, CelestialBody, ObserverLocation, Source,
    SwissEphemerisAdapter,
};
use horae_config::{load_almanac_config, AlmanacConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily cosmic almanac: zodiac, retrogrades, moon phase and planetary hours")]
struct Args {
    #[arg(long, help = "Path to almanac.toml (defaults to configs/almanac.toml if present)")]
    config: Option<PathBuf>,

    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    #[arg(long)]
    height: Option<f64>,

    #[arg(long, help = "RFC 3339 instant to compute for instead of now")]
    at: Option<String>,

    #[arg(long, help = "Only print the row of this body (e.g. Sol, Luna, Mars)")]
    body: Option<String>,

    #[arg(long, help = "Print the snapshot as JSON")]
    json: bool,

    #[arg(long, help = "Keep polling and print a snapshot every interval")]
    watch: bool,

    #[arg(long, help = "Paint body names in their theme colors (24-bit ANSI)")]
    color: bool,
}

fn settings_from(cfg: &AlmanacConfig) -> anyhow::Result<AlmanacSettings> {
    let utc_offset = FixedOffset::east_opt(cfg.almanac.utc_offset_minutes * 60)
        .ok_or_else(|| anyhow::anyhow!("invalid utc offset {}", cfg.almanac.utc_offset_minutes))?;
    Ok(AlmanacSettings {
        utc_offset,
        call_timeout: Duration::from_millis(cfg.almanac.body_timeout_ms),
    })
}

fn cell<T>(reading: &Reading<T>, show: impl Fn(&T) -> String) -> String {
    match reading {
        Reading::Available(value) => show(value),
        Reading::Unavailable { .. } => "unknown".to_string(),
    }
}

/// Wrap `text` in a 24-bit foreground escape for `#rrggbb`.
fn paint(hex: &str, text: &str) -> String {
    let channel = |range| hex.get(range).and_then(|h| u8::from_str_radix(h, 16).ok());
    match (channel(1..3), channel(3..5), channel(5..7)) {
        (Some(r), Some(g), Some(b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        _ => text.to_string(),
    }
}

fn body_label(body: CelestialBody, color: bool) -> String {
    let label = format!("{:<3} {:<8}", body.glyph(), body.name());
    if color {
        // light variant reads on dark terminals
        paint(body.colors().light, &label)
    } else {
        label
    }
}

fn body_line(report: &BodyReport, color: bool) -> String {
    let sign = cell(&report.zodiac, |sign| format!("{} {}", sign.glyph(), sign.name()));
    let status = cell(&report.status, |status| {
        status.map(|s| s.label()).unwrap_or_default()
    });
    format!("{} {:<16} {}", body_label(report.body, color), sign, status)
}

fn print_table(snapshot: &DailySnapshot, offset: FixedOffset, color: bool) {
    let local = |t: DateTime<Utc>| t.with_timezone(&offset).format("%H:%M").to_string();

    println!("{}", snapshot.instant.with_timezone(&offset).format("%A %Y-%m-%d %H:%M %:z"));
    println!(
        "Observer {:.4}, {:.4} at {:.0} m",
        snapshot.location.latitude, snapshot.location.longitude, snapshot.location.height_meters
    );
    println!();
    for report in &snapshot.bodies {
        println!("{}", body_line(report, color));
    }
    println!();

    let moon = cell(&snapshot.moon_phase, |reading| match reading.illuminated_fraction {
        Some(fraction) => format!(
            "{} {} ({:.0}% lit)",
            reading.phase.glyph(),
            reading.phase.name(),
            fraction * 100.0
        ),
        None => format!("{} {}", reading.phase.glyph(), reading.phase.name()),
    });
    println!("Moon phase: {}", moon);
    match &snapshot.luck {
        Reading::Available(rating) => println!("Luck: {}", rating.label()),
        // an unknown rating reads as neutral
        Reading::Unavailable { .. } => println!("Luck: Neutral (unknown)"),
    }

    match (&snapshot.hours, &snapshot.current_hour) {
        (Reading::Available(_), Some(slot)) => println!(
            "Planetary hour {} of 24: {} {} ({}-{})",
            slot.index,
            slot.body.glyph(),
            slot.body.name(),
            local(slot.start),
            local(slot.end)
        ),
        (Reading::Available(hours), None) if hours.is_empty() => {
            println!("Planetary hours: no sunrise or sunset today")
        }
        (Reading::Available(_), None) => println!("Planetary hours: outside the current day"),
        (Reading::Unavailable { .. }, _) => println!("Planetary hours: unknown"),
    }

    if let Reading::Available(hours) = &snapshot.hours {
        let half = if snapshot.show_night {
            hours.slots.get(12..)
        } else {
            hours.slots.get(..12)
        };
        for slot in half.unwrap_or_default() {
            let marker = if snapshot.current_hour.as_ref() == Some(slot) { ">" } else { " " };
            println!(
                "{} {:>2} {} - {}  {} {}",
                marker,
                slot.index,
                local(slot.start),
                local(slot.end),
                slot.body.glyph(),
                slot.body.name()
            );
        }
    }
}

fn emit(snapshot: &DailySnapshot, args: &Args, offset: FixedOffset) -> anyhow::Result<()> {
    if args.json {
        println!("{}", snapshot.to_json()?);
    } else {
        print_table(snapshot, offset, args.color);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let cfg = load_almanac_config(args.config.as_deref())?;
    let location = ObserverLocation::new(
        args.lat.unwrap_or(cfg.observer.latitude),
        args.lon.unwrap_or(cfg.observer.longitude),
        args.height.unwrap_or(cfg.observer.height_meters),
    )?;
    let settings = settings_from(&cfg)?;
    let offset = settings.utc_offset;

    let adapter = SwissEphemerisAdapter::new(cfg.ephemeris.path.clone())?;
    let almanac = Almanac::new(Arc::new(adapter), settings);

    if args.watch {
        let mut source = AlmanacSource::new(almanac, location, cfg.almanac.poll_interval_secs);
        log::info!("Polling {} every {}s", source.name(), cfg.almanac.poll_interval_secs);
        loop {
            tokio::select! {
                polled = source.poll() => {
                    if let Some(snapshot) = polled {
                        emit(&snapshot, &args, offset)?;
                        println!();
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        return Ok(());
    }

    let at = match args.at.as_deref() {
        Some(text) => parse_instant(text)?,
        None => Utc::now(),
    };
    let body = args.body.as_deref().map(str::parse::<CelestialBody>).transpose()?;
    let snapshot = almanac.snapshot(at, location).await?;
    match body.and_then(|body| snapshot.body(body)) {
        Some(report) if args.json => println!("{}", serde_json::to_string_pretty(report)?),
        Some(report) => println!("{}", body_line(report, args.color)),
        None => emit(&snapshot, &args, offset)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_uses_theme_color() {
        assert_eq!(paint("#ffd071", "Sol"), "\x1b[38;2;255;208;113mSol\x1b[0m");
        assert_eq!(paint("not-a-color", "Sol"), "Sol");
    }

    #[test]
    fn test_body_label_pads_before_painting() {
        let plain = body_label(CelestialBody::Mars, false);
        let painted = body_label(CelestialBody::Mars, true);
        assert!(painted.contains(&plain));
        assert!(painted.starts_with("\x1b[38;2;"));
        assert_eq!(plain.chars().count(), body_label(CelestialBody::Sun, false).chars().count());
    }
}
