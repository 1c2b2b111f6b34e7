use crate::component::video_remixer::FilterPreset;
use crate::config::save::save_settings;
use crate::config::{Config, ScheduleMode};
use crate::menu::handlers::run_video_remixer;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

const ESC_HINT: &str = "按 ESC 返回";

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 批次影片濾鏡混音工具 ===").cyan().bold());
    println!("{}", style(ESC_HINT).dim());

    let options = vec!["開始批次處理", "設定", "離開"];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_video_remixer(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(2) | None => Ok(false),
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style("=== 設定 ===").cyan().bold());
        println!("{}", style(ESC_HINT).dim());

        let settings = &config.settings;
        let options = vec![
            format!("ffmpeg 路徑: {}", settings.ffmpeg_program()),
            format!("同時執行數量: {}", settings.remixer.concurrency),
            format!("排程方式: {}", settings.remixer.schedule_mode),
            format!("濾鏡預設: {}", settings.remixer.filter_preset),
            "返回".to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇要修改的項目")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => edit_ffmpeg_path(config)?,
            Some(1) => edit_concurrency(config)?,
            Some(2) => edit_schedule_mode(term, config)?,
            Some(3) => edit_filter_preset(term, config)?,
            Some(4) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn edit_ffmpeg_path(config: &mut Config) -> Result<()> {
    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("ffmpeg 執行檔路徑（留空使用 PATH 中的 ffmpeg）")
        .with_initial_text(config.settings.ffmpeg_path.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let path = path.trim();
    config.settings.ffmpeg_path = (!path.is_empty()).then(|| path.to_string());
    saved(config)
}

fn edit_concurrency(config: &mut Config) -> Result<()> {
    let concurrency: usize = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("同時執行的 ffmpeg 數量")
        .default(config.settings.remixer.concurrency)
        .validate_with(|value: &usize| -> Result<(), &str> {
            if *value == 0 {
                Err("必須大於 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    if concurrency != config.settings.remixer.concurrency {
        config.settings.remixer.concurrency = concurrency;
        saved(config)?;
    }
    Ok(())
}

fn edit_schedule_mode(term: &Term, config: &mut Config) -> Result<()> {
    let modes = [ScheduleMode::Pooled, ScheduleMode::Batched];
    let items: Vec<String> = modes.iter().map(ToString::to_string).collect();

    let default_index = modes
        .iter()
        .position(|&m| m == config.settings.remixer.schedule_mode)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇排程方式")
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected = modes[selection];
    if selected != config.settings.remixer.schedule_mode {
        config.settings.remixer.schedule_mode = selected;
        saved(config)?;
    }
    Ok(())
}

fn edit_filter_preset(term: &Term, config: &mut Config) -> Result<()> {
    let presets = FilterPreset::ALL;
    let items: Vec<&str> = presets.iter().map(FilterPreset::as_str).collect();

    let default_index = presets
        .iter()
        .position(|&p| p == config.settings.remixer.filter_preset)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇濾鏡預設")
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let selected = presets[selection];
    if selected != config.settings.remixer.filter_preset {
        config.settings.remixer.filter_preset = selected;
        saved(config)?;
    }
    Ok(())
}

fn saved(config: &Config) -> Result<()> {
    save_settings(&config.settings)?;
    println!("\n{}", style("設定已儲存").green());
    std::thread::sleep(Duration::from_secs(1));
    Ok(())
}
