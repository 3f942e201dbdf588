use serde::Serialize;

pub struct Masked;

pub trait MaskPolicy {
    fn mask(value: &str) -> String;
}

impl MaskPolicy for Masked {
    /// Keep only the last four characters.
    fn mask(value: &str) -> String {
        let chars: Vec<char> = value.chars().collect();
        let len = chars.len();
        if len > 4 {
            "*".repeat(len - 4) + &chars[len - 4..].iter().collect::<String>()
        } else {
            value.to_string()
        }
    }
}

/// Return true if a key name likely holds a card number.
fn is_card_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k == "number" || k == "cardno" || k.contains("card_number") || k.contains("cardnumber")
}

/// Return true if a key name holds customer data or signing material that never goes to logs.
fn is_secret_key(key: &str) -> bool {
    let k = key.to_lowercase();
    matches!(k.as_str(), "pstn_mc" | "pstn_hmac" | "hmac" | "hmac_key" | "customer_details")
        || k.contains("email")
        || k.contains("phone")
}

pub fn secure_serializable(v: impl Serialize) -> serde_json::Value {
    match serde_json::to_value(v) {
        Ok(value) => secure_value(&value),
        Err(e) => serde_json::Value::String(format!("<unserializable: {e}>")),
    }
}

pub fn secure_value(v: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match v {
        Value::Object(map) => {
            let mut new = serde_json::Map::with_capacity(map.len());
            for (k, val) in map {
                let new_val = match val {
                    Value::String(_) if is_secret_key(k) => Value::String("***".to_string()),
                    Value::String(s) if is_card_key(k) => Value::String(Masked::mask(s)),
                    _ => secure_value(val),
                };
                new.insert(k.clone(), new_val);
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(secure_value).collect()),
        other => other.clone(),
    }
}

/// Mask the signature query pair of an endpoint url before logging it.
pub fn secure_url(url: &url::Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_key(&k) { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return masked.to_string();
    }
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn masks_card_numbers_and_customer_details() {
        let value = json!({
            "pstn_pi": "500600",
            "pstn_mc": "Example User,ACME",
            "card": { "number": "4111111111111111", "holder_name": "TIM TOOLMAN" },
        });
        let secured = secure_value(&value);
        assert_eq!(secured["pstn_pi"], "500600");
        assert_eq!(secured["pstn_mc"], "***");
        assert_eq!(secured["card"]["number"], "************1111");
        assert_eq!(secured["card"]["holder_name"], "TIM TOOLMAN");
    }

    #[test]
    fn short_values_are_kept() {
        assert_eq!(Masked::mask("123"), "123");
    }

    #[test]
    fn hides_hmac_in_urls() {
        let url = url::Url::parse("https://x.example/p?pstn_HMACTimestamp=1&pstn_HMAC=abcdef").unwrap();
        assert_eq!(secure_url(&url), "https://x.example/p?pstn_HMACTimestamp=1&pstn_HMAC=***");
    }
}
