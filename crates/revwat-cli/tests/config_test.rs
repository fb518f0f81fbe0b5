//! Config parsing and validation tests.

use revwat_cli::config::EmbedRequest;

fn base_toml() -> String {
    r#"
        data_path = "in"
        save_path = "out"
        message = "hello"
        blockchain_path = "ledger.json"
        data_type = "pgm"
    "#
    .to_string()
}

#[test]
fn embed_request_applies_defaults() {
    let request: EmbedRequest = toml::from_str(&base_toml()).unwrap();
    assert_eq!(request.stride, 3);
    assert_eq!(request.t_hi, 0);
    assert_eq!(request.bit_depth, 8);
    assert!(request.secret_key.is_none());
    assert!(request.kernel.is_none());
}

#[test]
fn embed_request_rejects_unknown_fields() {
    let toml = format!("{}\nbogus_field = 1\n", base_toml());
    let result: Result<EmbedRequest, _> = toml::from_str(&toml);
    assert!(result.is_err());
}

#[test]
fn embed_request_rejects_stride_smaller_than_kernel() {
    let toml = format!("{}\nstride = 1\n", base_toml());
    let request: EmbedRequest = toml::from_str(&toml).unwrap();
    assert!(request.validate().is_err());
}

#[test]
fn embed_request_rejects_bad_bit_depth() {
    let toml = format!("{}\nbit_depth = 12\n", base_toml());
    let request: EmbedRequest = toml::from_str(&toml).unwrap();
    assert!(request.validate().is_err());
}

#[test]
fn embed_request_custom_kernel_round_trips_through_config() {
    // Horizontal-neighbour average: zero center, sums to the denominator.
    let toml = format!(
        "{}\n[kernel]\nside = 3\ndenominator = 2\nnumerators = [0, 0, 0, 1, 0, 1, 0, 0, 0]\n",
        base_toml()
    );
    let request: EmbedRequest = toml::from_str(&toml).unwrap();
    assert!(request.kernel.is_some());
    assert!(request.validate().is_ok());
}

#[test]
fn embed_request_rejects_malformed_kernel() {
    // Even-sided kernels are not allowed: there's no unambiguous centre pixel.
    let toml = format!(
        "{}\n[kernel]\nside = 2\ndenominator = 1\nnumerators = [1, 1, 1, 1]\n",
        base_toml()
    );
    let result: Result<EmbedRequest, _> = toml::from_str(&toml);
    assert!(result.is_err());
}
