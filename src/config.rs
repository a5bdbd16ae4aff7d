//! Loader configuration.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the WebGPU shared library to open.
pub const LIBRARY_ENV: &str = "DNI_WEBGPU_LIBRARY";

/// Libraries tried, in order, when no path is configured.
#[cfg(target_os = "macos")]
pub const DEFAULT_CANDIDATES: &[&str] = &["libwebgpu_dawn.dylib", "libwgpu_native.dylib"];

#[cfg(all(unix, not(target_os = "macos")))]
pub const DEFAULT_CANDIDATES: &[&str] = &["libwebgpu_dawn.so", "libwgpu_native.so"];

// Runtime loading is unix-only; elsewhere `WebGpuLibrary::load` reports
// `Unsupported` before candidates are consulted.
#[cfg(not(unix))]
pub const DEFAULT_CANDIDATES: &[&str] = &[];

/// JSON schema for `dniLoadLibrary` options.
///
/// ```json
/// { "path": "/opt/dawn/lib/libwebgpu_dawn.so" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderOptions {
    /// Shared library to open. Falls back to `DNI_WEBGPU_LIBRARY`, then to
    /// the platform defaults.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoaderOptions {
    /// Options taken from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var_os(name))
    }

    /// Parse options JSON. `None` yields the environment defaults.
    pub fn from_json(json: Option<&str>) -> Result<Self, serde_json::Error> {
        Self::from_json_with_vars(json, |name| std::env::var_os(name))
    }

    /// Like [`from_env`](Self::from_env), reading variables through `var`.
    /// An empty `DNI_WEBGPU_LIBRARY` counts as unset.
    pub fn from_vars(var: impl Fn(&str) -> Option<OsString>) -> Self {
        Self {
            path: var(LIBRARY_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Like [`from_json`](Self::from_json), reading variables through `var`.
    /// An explicit `path` takes precedence over the environment.
    pub fn from_json_with_vars(
        json: Option<&str>,
        var: impl Fn(&str) -> Option<OsString>,
    ) -> Result<Self, serde_json::Error> {
        match json {
            Some(s) => {
                let mut options: Self = serde_json::from_str(s)?;
                if options.path.is_none() {
                    options.path = Self::from_vars(var).path;
                }
                Ok(options)
            }
            None => Ok(Self::from_vars(var)),
        }
    }

    /// Paths the loader should try, in order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        match &self.path {
            Some(path) => vec![path.clone()],
            None => DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_is_only_candidate() {
        let options =
            LoaderOptions::from_json(Some(r#"{"path": "/opt/dawn/libwebgpu_dawn.so"}"#)).unwrap();
        assert_eq!(
            options.candidates(),
            vec![PathBuf::from("/opt/dawn/libwebgpu_dawn.so")]
        );
    }

    fn vars(value: Option<&'static str>) -> impl Fn(&str) -> Option<OsString> {
        move |name| {
            assert_eq!(name, LIBRARY_ENV);
            value.map(OsString::from)
        }
    }

    #[test]
    fn test_env_path_is_only_candidate() {
        let options = LoaderOptions::from_vars(vars(Some("/opt/dawn/libwebgpu_dawn.so")));
        assert_eq!(
            options.candidates(),
            vec![PathBuf::from("/opt/dawn/libwebgpu_dawn.so")]
        );

        // Options JSON without a path falls back to the environment too.
        let options = LoaderOptions::from_json_with_vars(
            Some("{}"),
            vars(Some("/opt/dawn/libwebgpu_dawn.so")),
        )
        .unwrap();
        assert_eq!(options.path, Some(PathBuf::from("/opt/dawn/libwebgpu_dawn.so")));

        let options =
            LoaderOptions::from_json_with_vars(None, vars(Some("/opt/dawn/libwebgpu_dawn.so")))
                .unwrap();
        assert_eq!(options.path, Some(PathBuf::from("/opt/dawn/libwebgpu_dawn.so")));
    }

    #[test]
    fn test_empty_env_uses_defaults() {
        let options = LoaderOptions::from_vars(vars(Some("")));
        assert_eq!(options.path, None);
        assert_eq!(options.candidates().len(), DEFAULT_CANDIDATES.len());

        let options = LoaderOptions::from_vars(vars(None));
        assert_eq!(options, LoaderOptions::default());
    }

    #[test]
    fn test_json_path_beats_env() {
        let options = LoaderOptions::from_json_with_vars(
            Some(r#"{"path": "/usr/local/lib/libwgpu_native.so"}"#),
            vars(Some("/opt/dawn/libwebgpu_dawn.so")),
        )
        .unwrap();
        assert_eq!(
            options.candidates(),
            vec![PathBuf::from("/usr/local/lib/libwgpu_native.so")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_defaults_without_path() {
        let options = LoaderOptions::default();
        let candidates = options.candidates();
        assert_eq!(candidates.len(), DEFAULT_CANDIDATES.len());
        assert_eq!(candidates[0], PathBuf::from(DEFAULT_CANDIDATES[0]));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(LoaderOptions::from_json(Some(r#"{"paht": "x"}"#)).is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(LoaderOptions::from_json(Some("{")).is_err());
    }
}
