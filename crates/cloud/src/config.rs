/// Default API base URL of the media host.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Credentials and endpoint for the media host.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Overridable so tests and staging can point at a different host.
    pub api_base: String,
}

impl CloudinaryConfig {
    /// Load credentials from environment variables.
    ///
    /// | Env Var                 | Required | Default                             |
    /// |-------------------------|----------|-------------------------------------|
    /// | `CLOUDINARY_CLOUD_NAME` | **yes**  | --                                  |
    /// | `CLOUDINARY_API_KEY`    | **yes**  | --                                  |
    /// | `CLOUDINARY_API_SECRET` | **yes**  | --                                  |
    /// | `CLOUDINARY_API_BASE`   | no       | `https://api.cloudinary.com/v1_1`   |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or empty.
    pub fn from_env() -> Self {
        Self {
            cloud_name: required("CLOUDINARY_CLOUD_NAME"),
            api_key: required("CLOUDINARY_API_KEY"),
            api_secret: required("CLOUDINARY_API_SECRET"),
            api_base: std::env::var("CLOUDINARY_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.into()),
        }
    }
}

fn required(name: &str) -> String {
    let value = std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"));
    assert!(!value.trim().is_empty(), "{name} must not be empty");
    value
}
