use serde::{Deserialize, Serialize};

/// One entry of `GET 2/trends/by/woeid/{woeid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTrend {
    pub trend_name: String,
    #[serde(default)]
    pub tweet_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendsResponse {
    #[serde(default)]
    pub data: Option<Vec<ApiTrend>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceType {
    pub code: u32,
    pub name: String,
}

/// One entry of `GET 1.1/trends/available.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendLocation {
    pub name: String,
    pub woeid: u64,
    #[serde(default)]
    pub country: String,
    #[serde(default, rename = "countryCode")]
    pub country_code: Option<String>,
    #[serde(default, rename = "placeType")]
    pub place_type: Option<PlaceType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceTrend {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub tweet_volume: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceLocation {
    pub name: String,
    pub woeid: u64,
}

/// One element of `GET 1.1/trends/place.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceTrends {
    #[serde(default)]
    pub trends: Vec<PlaceTrend>,
    #[serde(default)]
    pub as_of: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub locations: Vec<PlaceLocation>,
}

/// Response of `POST oauth2/token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v2_trends_tolerate_missing_counts() {
        let body = r##"{"data":[{"trend_name":"#Rust","tweet_count":1200},{"trend_name":"Cargo"}]}"##;
        let resp: TrendsResponse = serde_json::from_str(body).unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data[0].tweet_count, Some(1200));
        assert_eq!(data[1].tweet_count, None);
    }

    #[test]
    fn locations_use_camel_case_keys() {
        let body = r#"{"name":"Warsaw","placeType":{"code":7,"name":"Town"},"url":"http://where.yahooapis.com/v1/place/523920","parentid":23424923,"country":"Poland","woeid":523920,"countryCode":"PL"}"#;
        let loc: TrendLocation = serde_json::from_str(body).unwrap();
        assert_eq!(loc.woeid, 523920);
        assert_eq!(loc.country_code.as_deref(), Some("PL"));
        assert_eq!(loc.place_type.map(|p| p.name), Some("Town".to_string()));
    }

    #[test]
    fn worldwide_location_has_null_country_code() {
        let body = r#"{"name":"Worldwide","placeType":{"code":19,"name":"Supername"},"parentid":0,"country":"","woeid":1,"countryCode":null}"#;
        let loc: TrendLocation = serde_json::from_str(body).unwrap();
        assert_eq!(loc.country_code, None);
        assert!(loc.country.is_empty());
    }
}
