use super::error::RemixError;
use super::filter_preset::FilterPreset;
use super::job_builder::{JobPlan, pick_music};
use crate::config::{FileCategory, FileTypeTable};
use crate::tools::{
    ensure_directory_exists, ffmpeg_available, list_files, validate_directory_exists,
    validate_directory_writable,
};
use anyhow::Result;
use log::info;
use rand::Rng;
use std::path::PathBuf;

/// 使用者輸入的一次批次處理設定
#[derive(Debug, Clone)]
pub struct RemixRequest {
    pub video_dir: PathBuf,
    pub music_dir: PathBuf,
    pub output_dir: PathBuf,
    pub image_path: Option<PathBuf>,
    pub preset: FilterPreset,
    pub ffmpeg: String,
}

/// 驗證通過、可以開始派送的內容
#[derive(Debug, Clone)]
pub struct PreparedRemix {
    pub videos: Vec<PathBuf>,
    pub music: Vec<PathBuf>,
}

impl RemixRequest {
    /// 檢查所有前置條件，任一項不符合就在派送前回報
    pub fn validate(&self, file_type_table: &FileTypeTable) -> Result<PreparedRemix> {
        validate_directory_exists(&self.music_dir)?;
        let music = list_files(&self.music_dir, file_type_table, FileCategory::Audio)?;
        if music.is_empty() {
            return Err(RemixError::NoMusicFiles(self.music_dir.clone()).into());
        }

        validate_directory_exists(&self.video_dir)?;
        let videos = list_files(&self.video_dir, file_type_table, FileCategory::Video)?;
        if videos.is_empty() {
            return Err(RemixError::NoVideoFiles(self.video_dir.clone()).into());
        }

        if let Some(image) = &self.image_path {
            if !image.is_file() {
                return Err(RemixError::ImageNotFound(image.clone()).into());
            }
            if !file_type_table.is_image_file(image) {
                return Err(RemixError::UnsupportedImage(image.clone()).into());
            }
        }

        ensure_directory_exists(&self.output_dir)?;
        if validate_directory_writable(&self.output_dir).is_err() {
            return Err(RemixError::OutputNotWritable(self.output_dir.clone()).into());
        }

        if !ffmpeg_available(&self.ffmpeg) {
            return Err(RemixError::FfmpegNotFound(self.ffmpeg.clone()).into());
        }

        info!(
            "驗證完成: {} 個影片, {} 首音樂",
            videos.len(),
            music.len()
        );

        Ok(PreparedRemix { videos, music })
    }

    /// 為每個影片產生任務，音樂與濾鏡參數各自獨立抽樣
    pub fn plan_jobs<R: Rng + ?Sized>(&self, prepared: &PreparedRemix, rng: &mut R) -> Vec<JobPlan> {
        prepared
            .videos
            .iter()
            .enumerate()
            .filter_map(|(id, video)| {
                let music = pick_music(&prepared.music, rng)?;
                Some(JobPlan::new(
                    id,
                    video,
                    music,
                    self.preset.render(rng),
                    self.image_path.as_deref(),
                    &self.output_dir,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::fs;
    use std::path::Path;

    struct Dirs {
        _root: tempfile::TempDir,
        videos: PathBuf,
        music: PathBuf,
        output: PathBuf,
    }

    fn dirs() -> Dirs {
        let root = tempfile::tempdir().unwrap();
        let videos = root.path().join("videos");
        let music = root.path().join("music");
        let output = root.path().join("output");
        fs::create_dir_all(&videos).unwrap();
        fs::create_dir_all(&music).unwrap();
        Dirs {
            videos,
            music,
            output,
            _root: root,
        }
    }

    fn request(d: &Dirs) -> RemixRequest {
        RemixRequest {
            video_dir: d.videos.clone(),
            music_dir: d.music.clone(),
            output_dir: d.output.clone(),
            image_path: None,
            preset: FilterPreset::Random,
            ffmpeg: "/nonexistent/ffmpeg".to_string(),
        }
    }

    fn table() -> FileTypeTable {
        Config::load_embedded_file_type_table().unwrap()
    }

    #[test]
    fn test_no_music_is_reported_first() {
        let d = dirs();
        fs::write(d.videos.join("a.mp4"), "v").unwrap();

        let err = request(&d).validate(&table()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RemixError>(),
            Some(RemixError::NoMusicFiles(_))
        ));
    }

    #[test]
    fn test_no_videos_is_reported() {
        let d = dirs();
        fs::write(d.music.join("song.mp3"), "a").unwrap();
        fs::write(d.videos.join("readme.txt"), "t").unwrap();

        let err = request(&d).validate(&table()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RemixError>(),
            Some(RemixError::NoVideoFiles(_))
        ));
    }

    #[test]
    fn test_missing_image_is_reported() {
        let d = dirs();
        fs::write(d.music.join("song.mp3"), "a").unwrap();
        fs::write(d.videos.join("a.mp4"), "v").unwrap();
        let mut req = request(&d);
        req.image_path = Some(d.videos.join("missing.png"));

        let err = req.validate(&table()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RemixError>(),
            Some(RemixError::ImageNotFound(_))
        ));
    }

    #[test]
    fn test_image_must_be_a_known_format() {
        let d = dirs();
        fs::write(d.music.join("song.mp3"), "a").unwrap();
        fs::write(d.videos.join("a.mp4"), "v").unwrap();
        let image = d.videos.join("end.gif");
        fs::write(&image, "i").unwrap();
        let mut req = request(&d);
        req.image_path = Some(image);

        let err = req.validate(&table()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RemixError>(),
            Some(RemixError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_missing_ffmpeg_is_reported_and_output_created() {
        let d = dirs();
        fs::write(d.music.join("song.mp3"), "a").unwrap();
        fs::write(d.videos.join("a.mp4"), "v").unwrap();

        let err = request(&d).validate(&table()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RemixError>(),
            Some(RemixError::FfmpegNotFound(_))
        ));
        assert!(d.output.is_dir());
    }

    #[test]
    fn test_plan_jobs_one_per_video() {
        let d = dirs();
        let prepared = PreparedRemix {
            videos: vec![d.videos.join("a.mp4"), d.videos.join("b.avi")],
            music: vec![d.music.join("song.mp3")],
        };
        let mut req = request(&d);
        req.image_path = Some(PathBuf::from("/img/end.png"));
        let mut rng = StdRng::seed_from_u64(5);

        let plans = req.plan_jobs(&prepared, &mut rng);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].id, 0);
        assert_eq!(plans[1].output_path, d.output.join("Edited_b.avi"));
        assert_eq!(plans[1].music_path, d.music.join("song.mp3"));
        assert_eq!(plans[0].image_path.as_deref(), Some(Path::new("/img/end.png")));
        // random 預設每個任務各自抽樣
        assert_ne!(plans[0].filter, plans[1].filter);
    }
}
