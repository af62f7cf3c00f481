pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_type_ok() {
        let s = types::Status::ok();
        assert_eq!(serde_json::to_value(&s).unwrap(), serde_json::json!({"status": "OK"}));
    }
}
