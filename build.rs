use std::env;

fn main() {
    // ビルド時に環境変数を埋め込む
    // 実行時の環境変数が優先され、ここで埋め込んだ値はフォールバックとしてのみ使用される
    // 未設定の変数は埋め込まず、実行時のデフォルト値に任せる

    for var_name in [
        "ENVIRONMENT",
        "API_SERVER_URL",
        "API_TIMEOUT_SECONDS",
        "API_MAX_RETRIES",
        "APPROVAL_AGGREGATION",
        "LOG_LEVEL",
    ] {
        println!("cargo:rerun-if-env-changed={}", var_name);
        if let Ok(value) = env::var(var_name) {
            println!("cargo:rustc-env={}={}", var_name, value);
        }
    }
}
