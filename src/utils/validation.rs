use crate::utils::error::{EtlError, Result};
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension) {
                return Err(EtlError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list<T>(field_name: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(EtlError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

/// 選擇器在設定載入時就要能解析，避免執行時才靜默失效
pub fn validate_css_selector(field_name: &str, selector: &str) -> Result<()> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: selector.to_string(),
            reason: format!("Invalid CSS selector: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("scrape.urls", "https://www.olx.in/items/q-car-cover").is_ok());
        assert!(validate_url("scrape.urls", "http://example.com").is_ok());
        assert!(validate_url("scrape.urls", "").is_err());
        assert!(validate_url("scrape.urls", "invalid-url").is_err());
        assert!(validate_url("scrape.urls", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("scrape.max_per_page", 25, 1).is_ok());
        assert!(validate_positive_number("scrape.max_per_page", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["car_cover_listings.csv".to_string()];
        assert!(validate_file_extensions("scrape.output_file", &files, &["csv"]).is_ok());

        let invalid_files = vec!["listings.xlsx".to_string()];
        assert!(validate_file_extensions("scrape.output_file", &invalid_files, &["csv"]).is_err());

        let no_extension = vec!["listings".to_string()];
        assert!(validate_file_extensions("scrape.output_file", &no_extension, &["csv"]).is_err());
    }

    #[test]
    fn test_validate_css_selector() {
        assert!(validate_css_selector("fields.title", r#"span[data-aut-id="itemTitle"]"#).is_ok());
        assert!(validate_css_selector("fields.title", "span._2tW1I ~ span").is_ok());
        assert!(validate_css_selector("fields.title", "span[[").is_err());
    }

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty_string("database.host", "  ").is_err());
        assert!(validate_non_empty_list::<String>("scrape.urls", &[]).is_err());
        assert!(validate_non_empty_list("scrape.urls", &["x"]).is_ok());
    }
}
