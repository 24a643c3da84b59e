use chrono::Utc;

fn main() {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", timestamp);

    // Bake the backend URL in when one is present at compile time.
    let base_url = ["BINGO_API_BASE_URL", "SHEET_URL"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_default();
    println!("cargo:rustc-env=BINGO_BUILD_API_BASE_URL={}", base_url);

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=BINGO_API_BASE_URL");
    println!("cargo:rerun-if-env-changed=SHEET_URL");
}
