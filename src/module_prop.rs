pub const MODULE_PROP_PATH: &str = "/data/adb/modules/device_faker/module.prop";
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Extracts the value of the first `version=` line from a `module.prop` file.
pub fn parse_version(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| line.trim_start().strip_prefix("version="))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_version_and_ignores_version_code() {
        let prop = "id=device_faker\nname=Device Faker\nversionCode=100\nversion=1.0.0 \n";
        assert_eq!(parse_version(prop), Some("1.0.0"));
    }

    #[test]
    fn missing_version() {
        assert_eq!(parse_version("id=device_faker\nversionCode=100\n"), None);
        assert_eq!(parse_version("version=\n"), None);
    }
}
