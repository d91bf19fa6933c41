use matview_core::{Cut, Matrix, View2D, BACKGROUND};
use matview_io::{load_cuts, load_matrix, save_cuts, SnapshotSurface};
use tempfile::tempdir;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn write_matrix(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("matrix.txt");
    // Row y = 0 first; the maximum sits at (3, 3).
    std::fs::write(
        &path,
        "# 4x4 test matrix\n0 1 1 1\n1 1 1 1\n1 1 1 1\n1 1 1 8\n",
    )
    .unwrap();
    path
}

#[test]
fn test_render_loaded_matrix_to_png() {
    let dir = tempdir().unwrap();
    let matrix = load_matrix(write_matrix(dir.path())).unwrap();
    assert_eq!((matrix.width(), matrix.height()), (4, 4));

    let mut view = View2D::new(matrix);
    view.layout(12, 12);
    let mut surface = SnapshotSurface::new(12, 12);
    view.redraw(&mut surface);

    let image = surface.image();
    // Bin (0, 0) is the 2x2 block at the bottom-left of the viewport.
    assert_eq!(image.get_pixel(2, 9).0, BLACK);
    assert_eq!(image.get_pixel(3, 8).0, BLACK);
    // Bin (3, 3) is at the top-right.
    assert_eq!(image.get_pixel(9, 2).0, RED);
    // Borders keep the background.
    assert_eq!(image.get_pixel(1, 1).0, BACKGROUND);
    assert_eq!(image.get_pixel(10, 10).0, BACKGROUND);

    let png = dir.path().join("out.png");
    surface.save_png(&png).unwrap();
    let decoded = image::open(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (12, 12));
    assert_eq!(decoded.get_pixel(9, 2).0, RED);
}

#[test]
fn test_loaded_cuts_are_drawn() {
    let dir = tempdir().unwrap();
    let matrix = load_matrix(write_matrix(dir.path())).unwrap();
    let cuts_path = dir.path().join("cuts.json");
    let magenta = [255, 0, 255, 255];
    save_cuts(
        &[Cut::new("row", vec![(0.0, 1.0), (3.0, 1.0)], false).with_color(magenta)],
        &cuts_path,
    )
    .unwrap();

    let mut view = View2D::new(matrix);
    view.layout(12, 12);
    for cut in load_cuts(&cuts_path).unwrap() {
        view.add_cut(cut);
    }
    let mut surface = SnapshotSurface::new(12, 12);
    view.redraw(&mut surface);

    let drawn = surface
        .image()
        .pixels()
        .filter(|px| px.0 == magenta)
        .count();
    assert!(drawn >= 6, "expected a horizontal cut line, got {drawn} pixels");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = load_matrix(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, matview_io::Error::Io(_)));
}
