use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::clients::LabApiClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{Device, Exam, Lab};
use crate::orchestrator::{LabDetailsView, LabsView, Tab, TimerField, ViewOptions};
use crate::services::confirm;
use crate::services::Confirm;
use crate::utils::logging;

/// 实验室 / 考试 / 设备管理控制台
#[derive(Debug, Parser)]
#[command(name = "lab-console", version, about = "Manage labs, their exams and devices")]
pub struct Cli {
    /// TOML 配置文件
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// 覆盖 API 地址
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// 跳过确认提示
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
    /// 显示详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 实验室
    Labs {
        #[command(subcommand)]
        command: LabsCommand,
    },
    /// 某个实验室的考试
    Exams {
        lab_id: String,
        #[command(subcommand)]
        command: ExamsCommand,
    },
    /// 某个实验室的设备
    Devices { lab_id: String },
    /// 打开实验室详情，持续显示自动模式产生的状态变化（Ctrl-C 退出）
    Watch { lab_id: String },
}

#[derive(Debug, Subcommand)]
pub enum LabsCommand {
    List,
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        lab_id: String,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExamsCommand {
    List,
    Create { name: String, url: String },
    Edit { exam_id: String, name: String, url: String },
    Delete { exam_id: String },
    /// 手动启动 / 停止
    ToggleStatus { exam_id: String },
    /// 开启 / 关闭自动模式
    ToggleAuto { exam_id: String },
    /// 设置并保存自动模式时间窗口（`YYYY-MM-DDTHH:MM`）
    SetWindow {
        exam_id: String,
        #[arg(long)]
        on: String,
        #[arg(long)]
        off: String,
    },
    /// 从现在开始自动运行一小时
    StartNow { exam_id: String },
}

/// 应用主结构
pub struct App {
    config: Config,
    client: LabApiClient,
    confirm: Arc<dyn Confirm>,
    command: Command,
}

impl App {
    /// 初始化应用：配置 → 日志 → 客户端
    pub fn initialize(cli: Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;
        if let Some(base_url) = cli.base_url {
            config.api_base_url = base_url;
        }
        config.assume_yes |= cli.yes;
        config.verbose_logging |= cli.verbose;

        logging::init(config.verbose_logging);
        logging::log_startup(&config);

        let client = LabApiClient::new(&config)?;
        let confirm = confirm::from_config(&config);

        Ok(Self {
            config,
            client,
            confirm,
            command: cli.command,
        })
    }

    /// 运行命令
    ///
    /// 操作失败时打印固定提示并返回错误，用户取消不算失败。
    pub async fn run(self) -> Result<()> {
        match self.dispatch().await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => {
                println!("{}", e.user_message());
                Ok(())
            }
            Err(e) => {
                error!("❌ {}", e);
                eprintln!("{}", e.user_message());
                Err(e.into())
            }
        }
    }

    async fn dispatch(&self) -> AppResult<()> {
        match &self.command {
            Command::Labs { command } => self.run_labs(command).await,
            Command::Exams { lab_id, command } => {
                let mut view = self.open_lab(lab_id).await;
                let result = run_exams(&mut view, command).await;
                view.close().await;
                result
            }
            Command::Devices { lab_id } => {
                let mut view = self.open_lab(lab_id).await;
                let result = view.switch_tab(Tab::Devices).await;
                if result.is_ok() {
                    render_devices(view.devices());
                }
                view.close().await;
                result
            }
            Command::Watch { lab_id } => self.watch(lab_id).await,
        }
    }

    async fn run_labs(&self, command: &LabsCommand) -> AppResult<()> {
        let mut labs = LabsView::new(self.client.clone());
        match command {
            LabsCommand::List => {
                render_labs(labs.load().await?);
            }
            LabsCommand::Create { name, description } => {
                let lab = labs.create_lab(name, description).await?;
                println!("Created lab {} ({})", lab.name, lab.id);
            }
            LabsCommand::Edit {
                lab_id,
                name,
                description,
            } => {
                let mut view = self.open_lab(lab_id).await;
                let result = view
                    .save_lab_edits(name, description)
                    .await
                    .map(|lab| println!("Saved lab {} ({})", lab.name, lab.id));
                view.close().await;
                result?;
            }
        }
        Ok(())
    }

    /// 打开实验室详情页，列表中找不到时使用占位实验室
    async fn open_lab(&self, lab_id: &str) -> LabDetailsView {
        let lab = match self.client.list_labs().await {
            Ok(labs) => labs.into_iter().find(|lab| lab.id == lab_id),
            Err(e) => {
                warn!("无法获取实验室列表: {}", e);
                None
            }
        }
        .unwrap_or_else(|| Lab::unknown(lab_id));

        LabDetailsView::open(
            self.client.clone(),
            lab,
            self.confirm.clone(),
            ViewOptions::from_config(&self.config),
        )
        .await
    }

    async fn watch(&self, lab_id: &str) -> AppResult<()> {
        let mut view = self.open_lab(lab_id).await;
        render_lab_header(view.lab());
        render_exams(&view.current_exams().await);

        let Some(mut transitions) = view.subscribe_transitions() else {
            view.close().await;
            return Ok(());
        };

        info!("👀 正在监视实验室 {}，按 Ctrl-C 退出", lab_id);
        loop {
            tokio::select! {
                event = transitions.recv() => match event {
                    Ok(transition) => println!("{}", transition),
                    Err(RecvError::Lagged(skipped)) => warn!("丢失了 {} 条状态变化", skipped),
                    Err(RecvError::Closed) => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        view.close().await;
        Ok(())
    }
}

async fn run_exams(view: &mut LabDetailsView, command: &ExamsCommand) -> AppResult<()> {
    match command {
        ExamsCommand::List => {
            render_lab_header(view.lab());
            render_exams(&view.current_exams().await);
        }
        ExamsCommand::Create { name, url } => {
            let exam = view.add_exam(name, url).await?;
            println!("Created exam {} ({})", exam.name, exam.id);
        }
        ExamsCommand::Edit { exam_id, name, url } => {
            let exam = view.save_exam_edits(exam_id, name, url).await?;
            render_exams(&[exam]);
        }
        ExamsCommand::Delete { exam_id } => {
            view.remove_exam(exam_id).await?;
            println!("Deleted exam {}", exam_id);
        }
        ExamsCommand::ToggleStatus { exam_id } => {
            let exam = view.toggle_status(exam_id).await?;
            render_exams(&[exam]);
        }
        ExamsCommand::ToggleAuto { exam_id } => {
            let exam = view.toggle_auto_mode(exam_id).await?;
            render_exams(&[exam]);
        }
        ExamsCommand::SetWindow { exam_id, on, off } => {
            view.update_timer(exam_id, TimerField::AutoOn, on).await?;
            view.update_timer(exam_id, TimerField::AutoOff, off).await?;
            let exam = view.save_auto_mode(exam_id).await?;
            render_exams(&[exam]);
        }
        ExamsCommand::StartNow { exam_id } => {
            view.enable_auto_start_now(exam_id).await?;
            let exam = view.save_auto_mode(exam_id).await?;
            render_exams(&[exam]);
        }
    }
    Ok(())
}

// ========== 文本输出 ==========

fn render_labs(labs: &[Lab]) {
    if labs.is_empty() {
        println!("No labs yet.");
        return;
    }
    for lab in labs {
        println!("{:<26} {:<24} {:<10} {}", lab.id, lab.name, lab.status, lab.description);
    }
}

fn render_lab_header(lab: &Lab) {
    println!("{} ({})", lab.name, lab.id);
    if !lab.description.is_empty() {
        println!("{}", lab.description);
    }
}

fn render_exams(exams: &[Exam]) {
    if exams.is_empty() {
        println!("No exams added yet.");
        return;
    }
    for exam in exams {
        let auto = if exam.auto_mode {
            format!("Auto: ON  [{} → {}]", exam.auto_on_time, exam.auto_off_time)
        } else {
            "Auto: OFF".to_string()
        };
        println!("{:<26} {:<8} {:<24} {}  {}", exam.id, exam.status, exam.name, exam.url, auto);
    }
}

fn render_devices(devices: &[Device]) {
    if devices.is_empty() {
        println!("No devices found.");
        return;
    }
    for device in devices {
        println!(
            "{:<20} {:<20} {:<16} {:<8} last seen {}",
            device.device_id,
            device.display_hostname(),
            device.display_ip(),
            device.status,
            device.display_last_seen()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exam_window_command() {
        let cli = Cli::try_parse_from([
            "lab-console",
            "-y",
            "exams",
            "lab-1",
            "set-window",
            "e1",
            "--on",
            "2025-01-01T10:00",
            "--off",
            "2025-01-01T11:00",
        ])
        .unwrap();

        assert!(cli.yes);
        match cli.command {
            Command::Exams {
                lab_id,
                command: ExamsCommand::SetWindow { exam_id, on, off },
            } => {
                assert_eq!(lab_id, "lab-1");
                assert_eq!(exam_id, "e1");
                assert_eq!(on, "2025-01-01T10:00");
                assert_eq!(off, "2025-01-01T11:00");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lab-console",
            "labs",
            "list",
            "--base-url",
            "http://10.0.0.5:3000",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://10.0.0.5:3000"));
        assert!(matches!(cli.command, Command::Labs { command: LabsCommand::List }));
    }
}
