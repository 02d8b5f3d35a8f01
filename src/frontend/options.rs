use crate::error::FrontendError;

pub const MIN_RELEASE: u32 = 1;
pub const MAX_RELEASE: u32 = 21;

/// Options a task was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    pub source: u32,
    pub target: u32,
    pub annotation_processing: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            source: MAX_RELEASE,
            target: MAX_RELEASE,
            annotation_processing: false,
        }
    }
}

impl CompilerOptions {
    pub fn parse(args: &[String]) -> Result<Self, FrontendError> {
        let mut options = CompilerOptions::default();
        let mut target = None;
        let mut args = args.iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-proc:none" => options.annotation_processing = false,
                "-source" => {
                    let value = args
                        .next()
                        .ok_or_else(|| FrontendError::InvalidOption(arg.clone()))?;
                    options.source = parse_release(value)?;
                }
                "-target" => {
                    let value = args
                        .next()
                        .ok_or_else(|| FrontendError::InvalidOption(arg.clone()))?;
                    target = Some(parse_release(value)?);
                }
                other => return Err(FrontendError::InvalidOption(other.to_string())),
            }
        }

        options.target = target.unwrap_or(options.source);
        if options.target < options.source {
            return Err(FrontendError::ReleaseConflict {
                source_release: options.source,
                target: options.target,
            });
        }

        Ok(options)
    }
}

/// Accepts both `8` and the legacy `1.8` spelling.
pub fn parse_release(value: &str) -> Result<u32, FrontendError> {
    let digits = match value.strip_prefix("1.") {
        Some(rest) if !rest.is_empty() => rest,
        _ => value,
    };

    match digits.parse::<u32>() {
        Ok(release) if (MIN_RELEASE..=MAX_RELEASE).contains(&release) => Ok(release),
        _ => Err(FrontendError::InvalidRelease(value.to_string())),
    }
}
