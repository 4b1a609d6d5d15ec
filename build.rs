//! Stamps the `i3df` binary with a build date and time.
//!
//! `I3DF_BUILD_DATE` and `I3DF_BUILD_TIME` in the environment override the
//! current UTC values, for reproducible builds.

use time::OffsetDateTime;

/// Emit `var` from the environment, or `now` rendered with `format`.
fn stamp(var: &str, format: &str, now: OffsetDateTime) {
    let value = std::env::var(var).unwrap_or_else(|_| {
        time::format_description::parse(format)
            .ok()
            .and_then(|f| now.format(&f).ok())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env={var}={value}");
    println!("cargo:rerun-if-env-changed={var}");
}

fn main() {
    let now = OffsetDateTime::now_utc();
    stamp("I3DF_BUILD_DATE", "[month repr:short] [day padding:space] [year]", now);
    stamp("I3DF_BUILD_TIME", "[hour]:[minute]:[second]", now);
}
