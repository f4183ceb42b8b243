//! Subcommand handlers. Each runs inside a logged-in session.

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::{Commands, CreatePlaylistArgs};
use ibcast_client::{
    ChecksumCache, ClientConfig, ClientError, IbcastClient, Session, Stage, UploadOutcome,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub(crate) async fn run(
    session: &mut Session<IbcastClient>,
    config: &CliConfig,
    cache: &mut ChecksumCache,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::CreatePlaylist(args) => create_playlist(session, args).await,
        Commands::SelectAlbum { filter } => select_album(session, &filter).await,
        Commands::SelectFolder { folder } => select_folder(session, &folder).await,
        Commands::Filetypes => filetypes(session).await,
        Commands::Upload { paths, force } => upload(session, config, cache, &paths, force).await,
        Commands::Playlists => playlists(session).await,
    }
}

async fn create_playlist(
    session: &mut Session<IbcastClient>,
    args: CreatePlaylistArgs,
) -> Result<()> {
    if args.folders.is_empty() && args.filters.is_empty() {
        return Err(CliError::Usage(
            "give at least one --folder or --filter".to_string(),
        ));
    }

    session.load_library().await?;

    for folder in &args.folders {
        let added = session.select_folder(folder)?;
        if added == 0 {
            warn!(folder = %folder, "Folder added no tracks");
        }
    }
    for filter in &args.filters {
        let added = session.select_albums(filter)?;
        if added == 0 {
            warn!(filter = %filter, "Album filter added no tracks");
        }
    }

    let tracks = session.selection().len();
    let playlist_id = session
        .submit(&args.name, &args.description, args.public)
        .await?;

    println!(
        "Created playlist \"{}\" ({}) with {} tracks",
        args.name, playlist_id, tracks
    );
    Ok(())
}

async fn select_album(session: &mut Session<IbcastClient>, filter: &str) -> Result<()> {
    session.load_library().await?;

    let albums = session.preview_albums(filter)?;
    let mut tracks = 0;
    for album in &albums {
        println!("{}\t{} tracks", album.name, album.tracks.len());
        tracks += album.tracks.len();
    }
    println!("{} albums, {} tracks match \"{}\"", albums.len(), tracks, filter);
    Ok(())
}

async fn select_folder(session: &mut Session<IbcastClient>, folder: &str) -> Result<()> {
    session.load_library().await?;

    let tracks = session.select_folder(folder)?;
    println!("{} tracks in \"{}\"", tracks, folder);
    Ok(())
}

async fn filetypes(session: &Session<IbcastClient>) -> Result<()> {
    let extensions = session
        .service()
        .library()
        .await?
        .client()
        .fetch_supported_filetypes()
        .await?;

    for extension in extensions {
        println!("{}", extension);
    }
    Ok(())
}

/// Load the checksum cache for the whole run; an unreadable file yields an
/// empty cache.
pub(crate) async fn load_checksum_cache(path: &Path) -> ChecksumCache {
    match ChecksumCache::load(path).await {
        Ok(cache) => cache,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable checksum cache");
            ChecksumCache::new()
        }
    }
}

fn ensure_uploads_enabled(config: &ClientConfig) -> Result<()> {
    if config.allow_undocumented {
        Ok(())
    } else {
        Err(ClientError::UndocumentedApiDisabled {
            stage: Stage::Upload,
            operation: "track upload",
        }
        .into())
    }
}

async fn upload(
    session: &Session<IbcastClient>,
    config: &CliConfig,
    cache: &mut ChecksumCache,
    paths: &[PathBuf],
    force: bool,
) -> Result<()> {
    let client = session.service();
    ensure_uploads_enabled(client.config())?;
    let cache_path = &config.upload.cache_path;

    let supported = match client.library().await?.client().fetch_supported_filetypes().await {
        Ok(extensions) => Some(extensions),
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Could not fetch supported filetypes, uploading everything");
            None
        }
    };

    let uploads = client.upload().await?;
    let mut failed = 0;
    let mut uploaded = 0;
    let mut skipped = 0;

    for path in paths {
        if let Some(supported) = &supported {
            if !is_supported(path, supported) {
                warn!(file = %path.display(), "File type not supported by the service, skipping");
                skipped += 1;
                continue;
            }
        }

        match uploads.client().upload_track(path, cache, force).await {
            Ok(UploadOutcome::Uploaded { .. }) => {
                println!("uploaded  {}", path.display());
                uploaded += 1;
            }
            Ok(UploadOutcome::AlreadyPresent { .. }) => {
                println!("present   {}", path.display());
                skipped += 1;
            }
            Err(e) if e.is_fatal() => {
                cache.save(cache_path).await?;
                return Err(e.into());
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "Upload failed");
                failed += 1;
            }
        }
    }

    cache.save(cache_path).await?;
    info!(uploaded, skipped, failed, "Upload finished");

    if failed > 0 {
        return Err(CliError::UploadsFailed {
            failed,
            total: paths.len(),
        });
    }
    Ok(())
}

async fn playlists(session: &mut Session<IbcastClient>) -> Result<()> {
    let snapshot = session.load_library().await?;

    let mut playlists: Vec<_> = snapshot.playlists().collect();
    playlists.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    for playlist in playlists {
        println!("{}\t{} tracks\t{}", playlist.name, playlist.tracks.len(), playlist.id);
    }
    Ok(())
}

/// Whether the service lists the file's extension as uploadable.
fn is_supported(path: &Path, supported: &[String]) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };

    supported
        .iter()
        .any(|s| s.trim_start_matches('.').eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_uploads_refused_up_front_when_disabled() {
        let config = ClientConfig::default();
        match ensure_uploads_enabled(&config) {
            Err(CliError::Client(ClientError::UndocumentedApiDisabled { stage, operation })) => {
                assert_eq!(stage, Stage::Upload);
                assert_eq!(operation, "track upload");
            }
            other => panic!("Expected UndocumentedApiDisabled, got: {:?}", other),
        }

        assert!(ensure_uploads_enabled(&config.with_undocumented_apis(true)).is_ok());
    }

    #[tokio::test]
    async fn test_corrupt_checksum_cache_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checksums.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let cache = load_checksum_cache(&path).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_checksum_cache_loaded_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checksums.json");
        let mut saved = ChecksumCache::new();
        saved.record_upload(None, "900150983cd24fb0d6963f7d28e17f72");
        saved.save(&path).await.unwrap();

        let cache = load_checksum_cache(&path).await;
        assert!(cache.was_uploaded("900150983cd24fb0d6963f7d28e17f72"));
    }

    #[test]
    fn test_is_supported() {
        let supported = vec![".mp3".to_string(), ".flac".to_string()];

        assert!(is_supported(Path::new("song.mp3"), &supported));
        assert!(is_supported(Path::new("dir/song.FLAC"), &supported));
        assert!(!is_supported(Path::new("song.wav"), &supported));
        assert!(!is_supported(Path::new("README"), &supported));
    }
}
