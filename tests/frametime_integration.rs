use vox_tools::frametime::{self, FrameTimeSummary};
use vox_tools::ToolError;

fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write CSV fixture");
    path
}

fn report(summary: &FrameTimeSummary) -> String {
    let mut out = Vec::new();
    summary.write_report(&mut out).expect("Writing to a Vec cannot fail");
    String::from_utf8(out).expect("Report is UTF-8")
}

#[test]
fn test_constant_frame_time_report() {
    let dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
    let path = write_csv(
        &dir,
        "PerformanceData.csv",
        "Frame,FrameTime\n0,16.0\n1,16.0\n2,16.0\n",
    );

    let summary = frametime::summarize_file(&path, "FrameTime")
        .expect("Summarizing should succeed");

    assert_eq!(summary.sample_count, 3);
    assert_eq!(
        report(&summary),
        "Mean Frame Time: 16.0 ms\nMean FPS: 62.5\n"
    );
}

#[test]
fn test_mean_and_fps_over_varying_samples() {
    let dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
    let path = write_csv(
        &dir,
        "run.csv",
        "FrameTime,GpuTime\n10,1\n20,2\n30,3\n40,4\n",
    );

    let summary = frametime::summarize_file(&path, "FrameTime")
        .expect("Summarizing should succeed");

    assert_eq!(summary.mean_frame_time_ms, 25.0);
    assert_eq!(summary.mean_fps, 40.0);
    assert_eq!(
        report(&summary),
        "Mean Frame Time: 25.0 ms\nMean FPS: 40.0\n"
    );
}

#[test]
fn test_other_column_by_name() {
    let dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
    let path = write_csv(&dir, "run.csv", "FrameTime,GpuTime\n10,4\n20,8\n");

    let summary = frametime::summarize_file(&path, "GpuTime").expect("Summarizing should succeed");
    assert_eq!(summary.mean_frame_time_ms, 6.0);
}

#[test]
fn test_missing_column_lists_headers() {
    let dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
    let path = write_csv(&dir, "run.csv", "Frame,Time\n0,16\n");

    match frametime::summarize_file(&path, "FrameTime") {
        Err(ToolError::MissingColumn { column, available }) => {
            assert_eq!(column, "FrameTime");
            assert_eq!(available, "Frame, Time");
        }
        other => panic!("Expected MissingColumn error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
    let result = frametime::summarize_file(dir.path().join("absent.csv"), "FrameTime");
    assert!(result.is_err());
}

#[test]
fn test_binary_prints_nan_for_empty_column() {
    let dir = tempfile::TempDir::new().expect("Failed to create temporary directory");
    write_csv(&dir, "empty.csv", "Frame,FrameTime\n0,\n1,NA\n");

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_frametime"))
        .arg("empty.csv")
        .current_dir(dir.path())
        .output()
        .expect("Failed to run frametime");

    assert!(output.status.success(), "status was {:?}", output.status);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Mean Frame Time: nan ms\nMean FPS: nan\n"
    );
}
