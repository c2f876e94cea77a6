use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Installs the stderr log formatter. `RUST_LOG` overrides the default level.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(c);
    }
    formatted
}

/// Masks every label but the TLD. Short names collapse to `???` so their
/// length does not give them away.
pub fn redact_domain(domain: &str) -> String {
    let Some((name, tld)) = domain.rsplit_once('.') else {
        return domain.to_string();
    };
    let registrable = name.rsplit('.').next().unwrap_or_default();
    if registrable.len() <= 3 {
        return format!("???.{}", tld);
    }

    let masked: String = name
        .chars()
        .map(|c| if c == '.' { '.' } else { '*' })
        .collect();
    format!("{}.{}", masked, tld)
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if let Some(top) = args.top {
        if top == 0 {
            anyhow::bail!("--top must be greater than 0");
        }
    }

    let filter = crate::report::filter_from_args(args);
    let bounds = (filter.active_min_time(), filter.active_max_time());
    if let (Some(min_time), Some(max_time)) = bounds {
        if min_time > max_time {
            anyhow::bail!("--min-time must not be later than --max-time");
        }
    }

    for (flag, value) in [("--min-time", args.min_time), ("--max-time", args.max_time)] {
        if matches!(value, Some(t) if t < 0) {
            anyhow::bail!("{} must not be negative", flag);
        }
    }

    Ok(())
}
