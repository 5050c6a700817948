use thiserror::Error;

/// Everything that can go wrong while turning user input into a resolved location.
///
/// Every variant is recoverable by the user: callers surface a short message and keep
/// whatever was displayed before.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Location not found, request rejected upstream, or a malformed response.
    #[error("Could not resolve location: {0}")]
    Resolution(String),

    /// Transport failure or timeout talking to the provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The platform refused or does not support geolocation.
    #[error("Geolocation unavailable: {0}")]
    GeolocationDenied(String),

    /// The user submitted something we refuse to send upstream.
    #[error("Invalid input: {0}")]
    InputValidation(String),
}

impl WeatherError {
    pub fn resolution<S: Into<String>>(message: S) -> Self {
        Self::Resolution(message.into())
    }

    pub fn geolocation_denied<S: Into<String>>(message: S) -> Self {
        Self::GeolocationDenied(message.into())
    }

    pub fn input_validation<S: Into<String>>(message: S) -> Self {
        Self::InputValidation(message.into())
    }

    /// Short message suitable for showing next to the search box.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Resolution(msg) => format!("City not found or API error ({msg})"),
            WeatherError::Network(err) if err.is_timeout() => {
                "The weather service did not answer in time. Please try again.".to_string()
            }
            WeatherError::Network(_) => {
                "Unable to reach the weather service. Please check your connection.".to_string()
            }
            WeatherError::GeolocationDenied(_) => "Unable to retrieve your location".to_string(),
            WeatherError::InputValidation(msg) => msg.clone(),
        }
    }
}
