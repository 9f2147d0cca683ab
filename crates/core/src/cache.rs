use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::{
    analyzer::Analyzer,
    error::{AnalyzerError, Result},
    provider::Provider,
    types::Segment,
};

/// Get the cache directory for a given video payload under `root`
pub fn get_cache_dir_in(root: &Path, video: &[u8]) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    video.hash(&mut hasher);
    root.join(format!("{:016x}", hasher.finish()))
}

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("storyboard")
}

/// Get the path for cached analyzer segments (provider aware)
pub fn get_segments_path(cache_dir: &Path, provider: &Provider) -> PathBuf {
    let provider_name = match provider {
        Provider::GeminiFlash => "gemini-flash",
        Provider::GeminiPro => "gemini-pro",
    };
    cache_dir.join(format!("segments_{}.json", provider_name))
}

/// Load analyzer segments from a cached file
pub async fn load_segments(path: &Path) -> Result<Vec<Segment>> {
    let json_content = fs::read_to_string(path).await?;
    let segments: Vec<Segment> = serde_json::from_str(&json_content)?;
    Ok(segments)
}

/// Save analyzer segments to a file
pub async fn save_segments(segments: &[Segment], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let pretty_json = serde_json::to_string_pretty(segments)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

/// Reuses analyzer output for a video it has already seen. Only segments
/// are stored, never the video itself.
pub struct CachedAnalyzer<A> {
    inner: A,
    provider: Provider,
    root: PathBuf,
    force: bool,
}

impl<A: Analyzer> CachedAnalyzer<A> {
    pub fn new(inner: A, provider: Provider, root: PathBuf, force: bool) -> Self {
        Self {
            inner,
            provider,
            root,
            force,
        }
    }
}

#[async_trait]
impl<A: Analyzer> Analyzer for CachedAnalyzer<A> {
    async fn analyze(
        &self,
        video: &[u8],
        mime_type: &str,
    ) -> std::result::Result<Vec<Segment>, AnalyzerError> {
        let path = get_segments_path(&get_cache_dir_in(&self.root, video), &self.provider);

        if !self.force && path.exists() {
            match load_segments(&path).await {
                Ok(segments) => {
                    info!(segments = segments.len(), "using cached analysis {}", path.display());
                    return Ok(segments);
                }
                Err(e) => warn!("ignoring unreadable cache {}: {}", path.display(), e),
            }
        }

        let segments = self.inner.analyze(video, mime_type).await?;
        if let Err(e) = save_segments(&segments, &path).await {
            warn!("could not cache analysis at {}: {}", path.display(), e);
        }
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_depends_on_content() {
        let root = Path::new("/cache");
        let a = get_cache_dir_in(root, b"video-a");
        assert_eq!(a, get_cache_dir_in(root, b"video-a"));
        assert_ne!(a, get_cache_dir_in(root, b"video-b"));
        assert!(a.starts_with(root));
    }

    #[tokio::test]
    async fn test_segments_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_segments_path(&dir.path().join("abc"), &Provider::GeminiFlash);
        let segments = vec![Segment {
            start_time: 0.0,
            end_time: 4.5,
            script: "[Music/No Audio]".into(),
            description: "title card".into(),
        }];

        save_segments(&segments, &path).await.unwrap();
        assert_eq!(load_segments(&path).await.unwrap(), segments);
        assert!(path.ends_with("segments_gemini-flash.json"));
    }

    struct Counting {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Analyzer for Counting {
        async fn analyze(
            &self,
            _video: &[u8],
            _mime_type: &str,
        ) -> std::result::Result<Vec<Segment>, AnalyzerError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(vec![Segment {
                start_time: 0.0,
                end_time: 1.0,
                script: "hi".into(),
                description: "wave".into(),
            }])
        }
    }

    #[tokio::test]
    async fn test_cached_analyzer_skips_second_call_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedAnalyzer::new(
            Counting {
                calls: Default::default(),
            },
            Provider::GeminiFlash,
            dir.path().to_path_buf(),
            false,
        );

        let first = cached.analyze(b"bytes", "video/mp4").await.unwrap();
        let second = cached.analyze(b"bytes", "video/mp4").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        let forced = CachedAnalyzer::new(cached.inner, Provider::GeminiFlash, dir.path().to_path_buf(), true);
        forced.analyze(b"bytes", "video/mp4").await.unwrap();
        assert_eq!(forced.inner.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
