use anyhow::Result;
use clap::Parser;
use lab_console::app::{App, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行
    let cli = Cli::parse();

    // 初始化并运行应用
    App::initialize(cli)?.run().await
}
