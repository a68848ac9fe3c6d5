//! Small helpers shared by the tender service crates.

/// Prefix of symbols that belong to this workspace.
const CRATE_SYMBOL_PREFIX: &str = "<tf";

pub trait LogErr<T, E: std::error::Error> {
    /// Logs `Err` on error level together with the first frame of the call
    /// stack that belongs to our crates. Returns the Result unchanged.
    fn log_err(self) -> Result<T, E>;

    /// Same as `log_err`, but on warn level. For errors caused by the client.
    fn log_warn(self) -> Result<T, E>;
}

impl<T, E: std::error::Error> LogErr<T, E> for Result<T, E> {
    fn log_err(self) -> Result<T, E> {
        if let Err(e) = &self {
            let origin = caller_origin().unwrap_or_else(|| "<unknown>".to_string());
            log::error!("Error at {}: {}", origin, e);
        }
        self
    }

    fn log_warn(self) -> Result<T, E> {
        if let Err(e) = &self {
            let origin = caller_origin().unwrap_or_else(|| "<unknown>".to_string());
            log::warn!("Error at {}: {}", origin, e);
        }
        self
    }
}

/// Name of the innermost `impl` frame from our crates, without the trait part.
fn caller_origin() -> Option<String> {
    let mut origin = None;
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if origin.is_some() {
                return;
            }
            if let Some(name) = symbol.name().map(|s| s.to_string()) {
                origin = impl_name(&name).map(str::to_string);
            }
        });
        origin.is_none()
    });
    origin
}

fn impl_name(symbol: &str) -> Option<&str> {
    if !symbol.starts_with(CRATE_SYMBOL_PREFIX) {
        return None;
    }
    symbol.strip_prefix('<')?.split(" as ").next()
}
