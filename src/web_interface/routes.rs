use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use uuid::Uuid;
use warp::{http::StatusCode, reply, Filter, Rejection, Reply};

use super::types::{ApiError, DownloadQuery, RunBruteParams, RunDumpParams, SessionData, SessionQuery};
use crate::configuration::Config;
use crate::cracking::CrackManager;
use crate::credentials::CredsCorrelator;
use crate::dumping::DumpManager;
use crate::error_handling::types::LaunchError;

/// Downloadable dump artifacts are `{uuidv4}_{suffix}.ntds`; anything else
/// is rejected before touching the filesystem.
static DUMP_FILE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}_[A-Za-z0-9.$-]+\.ntds$",
    )
    .expect("dump file name regex is valid")
});

fn bad_request(message: &str) -> warp::reply::Response {
    reply::with_status(
        reply::json(&ApiError {
            message: message.to_string(),
        }),
        StatusCode::BAD_REQUEST,
    )
    .into_response()
}

fn not_found(message: &str) -> warp::reply::Response {
    reply::with_status(
        reply::json(&ApiError {
            message: message.to_string(),
        }),
        StatusCode::NOT_FOUND,
    )
    .into_response()
}

fn internal_error(message: String) -> warp::reply::Response {
    reply::with_status(
        reply::json(&ApiError { message }),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .into_response()
}

fn ok_json<T: serde::Serialize>(value: &T) -> warp::reply::Response {
    reply::with_status(reply::json(value), StatusCode::OK).into_response()
}

fn parse_session(query: &SessionQuery) -> Result<Uuid, warp::reply::Response> {
    Uuid::parse_str(&query.session_name).map_err(|_| bad_request("Invalid session name"))
}

fn launch_error_reply(err: LaunchError) -> warp::reply::Response {
    match err {
        LaunchError::InvalidName(message) => bad_request(&message),
        other => internal_error(other.to_string()),
    }
}

/// GET / -> endpoint overview
pub fn dashboard_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path::end().and(warp::get()).and_then(|| async move {
        let html = r#"<html><head><title>hashforge</title></head>
                <body><h1>hashforge is running</h1>
                <p>See /brute-ntlm, /dump-ntlm, /creds and /technical endpoints.</p></body></html>"#;
        Ok::<_, Rejection>(reply::html(html))
    })
}

/// POST /brute-ntlm/run
pub fn run_brute_route(
    crack: Arc<CrackManager>,
    config: Arc<Config>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("brute-ntlm" / "run")
        .and(warp::post())
        .and(warp::body::json())
        .and_then(move |params: RunBruteParams| {
            let crack = crack.clone();
            let config = config.clone();
            async move {
                let hash_file = PathBuf::from(&params.hash_file_path);
                let dictionary = config
                    .directories
                    .dictionaries
                    .join(&params.dictionary_file_name);
                let rules = config.directories.rules.join(&params.rules_file_name);

                let res = match crack.run_instance(&hash_file, &dictionary, &rules).await {
                    Ok(session_name) => ok_json(&SessionData { session_name }),
                    Err(e) => launch_error_reply(e),
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// POST /brute-ntlm/re-run
pub fn re_run_brute_route(
    crack: Arc<CrackManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("brute-ntlm" / "re-run")
        .and(warp::post())
        .and(warp::query::<SessionQuery>())
        .and_then(move |query: SessionQuery| {
            let crack = crack.clone();
            async move {
                let res = match parse_session(&query) {
                    Ok(session_id) => match crack.re_run_instance(session_id).await {
                        Ok(report) => ok_json(&report),
                        Err(e) => launch_error_reply(e),
                    },
                    Err(res) => res,
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// GET /brute-ntlm/info
pub fn brute_info_route(
    crack: Arc<CrackManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("brute-ntlm" / "info")
        .and(warp::get())
        .and(warp::query::<SessionQuery>())
        .and_then(move |query: SessionQuery| {
            let crack = crack.clone();
            async move {
                let res = match parse_session(&query) {
                    Ok(session_id) => ok_json(&crack.instance_info(session_id).await),
                    Err(res) => res,
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// GET /brute-ntlm/info-all
pub fn brute_info_all_route(
    crack: Arc<CrackManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("brute-ntlm" / "info-all")
        .and(warp::get())
        .and_then(move || {
            let crack = crack.clone();
            async move { Ok::<_, Rejection>(ok_json(&crack.all_instances_info().await)) }
        })
}

/// POST /dump-ntlm/run
pub fn run_dump_route(
    dump: Arc<DumpManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("dump-ntlm" / "run")
        .and(warp::post())
        .and(warp::body::json())
        .and_then(move |params: RunDumpParams| {
            let dump = dump.clone();
            async move {
                let res = match dump
                    .run_instance(&params.target, params.just_dc_user.as_deref())
                    .await
                {
                    Ok(session_name) => ok_json(&SessionData { session_name }),
                    Err(e) => launch_error_reply(e),
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// GET /dump-ntlm/status
pub fn dump_status_route(
    dump: Arc<DumpManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("dump-ntlm" / "status")
        .and(warp::get())
        .and(warp::query::<SessionQuery>())
        .and_then(move |query: SessionQuery| {
            let dump = dump.clone();
            async move {
                let res = match parse_session(&query) {
                    Ok(session_id) => ok_json(&dump.instance_status(session_id).await),
                    Err(res) => res,
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// GET /dump-ntlm/download-hashes
pub fn download_hashes_route(
    config: Arc<Config>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("dump-ntlm" / "download-hashes")
        .and(warp::get())
        .and(warp::query::<DownloadQuery>())
        .and_then(move |query: DownloadQuery| {
            let config = config.clone();
            async move {
                let path = Path::new(&query.file_path);
                if !is_downloadable_dump_file(path, &config.directories.dumps) {
                    return Ok::<_, Rejection>(not_found("File not found"));
                }
                let res = match std::fs::read(path) {
                    Ok(bytes) => reply::with_status(
                        reply::with_header(bytes, "Content-Type", "application/octet-stream"),
                        StatusCode::OK,
                    )
                    .into_response(),
                    Err(_) => not_found("File not found"),
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// Whether `path` names a dump artifact inside the configured dumps
/// directory. The basename shape is regex-checked so only convention-named
/// `.ntds` files are ever served.
fn is_downloadable_dump_file(path: &Path, dumps_dir: &Path) -> bool {
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    if !DUMP_FILE_NAME_REGEX.is_match(&file_name) {
        return false;
    }
    path.parent() == Some(dumps_dir) && path.is_file()
}

/// GET /creds/bruted
pub fn bruted_creds_route(
    creds: Arc<CredsCorrelator>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("creds" / "bruted")
        .and(warp::get())
        .and(warp::query::<SessionQuery>())
        .and_then(move |query: SessionQuery| {
            let creds = creds.clone();
            async move {
                let res = match parse_session(&query) {
                    Ok(session_id) => match creds.bruted_creds(&session_id) {
                        Ok(report) => ok_json(&report),
                        Err(e) => internal_error(e.to_string()),
                    },
                    Err(res) => res,
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// GET /technical/run-benchmark
pub fn run_benchmark_route(
    crack: Arc<CrackManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("technical" / "run-benchmark")
        .and(warp::get())
        .and_then(move || {
            let crack = crack.clone();
            async move {
                let res = match crack.run_benchmark().await {
                    Ok(report) => ok_json(&report),
                    Err(e) => launch_error_reply(e),
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// GET /technical/clean-brute
pub fn clean_brute_route(
    crack: Arc<CrackManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("technical" / "clean-brute")
        .and(warp::get())
        .and(warp::query::<SessionQuery>())
        .and_then(move |query: SessionQuery| {
            let crack = crack.clone();
            async move {
                let res = match parse_session(&query) {
                    Ok(session_id) => {
                        crack.cleanup(&session_id).await;
                        ok_json(&"success")
                    }
                    Err(res) => res,
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// GET /technical/clean-dump
pub fn clean_dump_route(
    dump: Arc<DumpManager>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("technical" / "clean-dump")
        .and(warp::get())
        .and(warp::query::<SessionQuery>())
        .and_then(move |query: SessionQuery| {
            let dump = dump.clone();
            async move {
                let res = match parse_session(&query) {
                    Ok(session_id) => {
                        dump.cleanup(&session_id).await;
                        ok_json(&"success")
                    }
                    Err(res) => res,
                };
                Ok::<_, Rejection>(res)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_check_accepts_convention_named_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let dumps = dir.path().to_path_buf();
        let id = Uuid::new_v4();

        let good = dumps.join(format!("{}_all_users.ntds", id));
        std::fs::write(&good, "admin:1000:aaa:bbb:::\n").unwrap();
        assert!(is_downloadable_dump_file(&good, &dumps));

        // Wrong extension.
        let wrong_ext = dumps.join(format!("{}_all_users.txt", id));
        std::fs::write(&wrong_ext, "x").unwrap();
        assert!(!is_downloadable_dump_file(&wrong_ext, &dumps));

        // No session identifier stem.
        let no_uuid = dumps.join("latest_all_users.ntds");
        std::fs::write(&no_uuid, "x").unwrap();
        assert!(!is_downloadable_dump_file(&no_uuid, &dumps));

        // Outside the dumps directory.
        let elsewhere = dir.path().join("sub");
        std::fs::create_dir_all(&elsewhere).unwrap();
        let outside = elsewhere.join(format!("{}_all_users.ntds", id));
        std::fs::write(&outside, "x").unwrap();
        assert!(!is_downloadable_dump_file(&outside, &dumps));

        // Convention-named but absent.
        let missing = dumps.join(format!("{}_ghost.ntds", Uuid::new_v4()));
        assert!(!is_downloadable_dump_file(&missing, &dumps));
    }
}
