use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};
use skel_core::{Calibration, Volume, to_f32, to_f32_u16};
use skel_graph::{
    AnalyzeConfig, PruneMode, SkeletonAnalysis, VertexKind, analyze_skeleton,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "skel_gallery")]
#[command(about = "Run skeleton analysis on external fixtures")]
struct Cli {
    /// Log every analysis phase.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "analyze")]
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// One PNG per z slice, in z order.
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,
    /// Expected extent and counts; checked after the run.
    #[arg(long)]
    truth: Option<PathBuf>,
    #[arg(long, default_value = "docs/fig/raw")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Voxel spacing as `sx,sy,sz`.
    #[arg(long, value_parser = parse_calibration)]
    calibration: Option<Calibration>,
    /// none, shortest-branch, lowest-intensity-voxel or lowest-intensity-branch.
    #[arg(long, default_value = "none")]
    prune: PruneMode,
    /// Grayscale slices for the intensity prune modes (8 or 16 bit).
    #[arg(long, num_args = 1..)]
    intensity: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TruthEnvelope {
    case: String,
    width: usize,
    height: usize,
    depth: usize,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    truth: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ExpectedCounts {
    #[serde(default)]
    trees: Option<usize>,
    #[serde(default)]
    branches: Option<usize>,
    #[serde(default)]
    junctions: Option<usize>,
    #[serde(default)]
    end_points: Option<usize>,
}

#[derive(Debug, Serialize)]
struct TreeStatsDto {
    tree: u16,
    branches: usize,
    junctions: usize,
    end_points: usize,
    junction_voxels: usize,
    slabs: usize,
    voxels: usize,
    triple_points: usize,
    quadruple_points: usize,
    average_branch_length: f64,
    maximum_branch_length: f64,
}

#[derive(Debug, Serialize)]
struct SummaryDto {
    width: usize,
    height: usize,
    depth: usize,
    calibration: [f64; 3],
    prune: String,
    trees: usize,
    branches: usize,
    junctions: usize,
    end_points: usize,
    junction_voxels: usize,
    slabs: usize,
    total_length: f64,
    starting_slabs: Vec<[i32; 3]>,
    pruned: Vec<[i32; 3]>,
    issues: Vec<String>,
    per_tree: Vec<TreeStatsDto>,
}

#[derive(Debug, Serialize)]
struct VertexDto {
    id: usize,
    kind: &'static str,
    points: Vec<[i32; 3]>,
}

#[derive(Debug, Serialize)]
struct EdgeDto {
    id: usize,
    v1: usize,
    v2: usize,
    length: f64,
    slabs: Vec<[i32; 3]>,
}

#[derive(Debug, Serialize)]
struct GraphDto {
    tree: u16,
    root: Option<usize>,
    vertices: Vec<VertexDto>,
    edges: Vec<EdgeDto>,
}

#[derive(Debug, Serialize)]
struct BranchDto {
    tree: u16,
    length: f64,
    v1: [f64; 3],
    v2: [f64; 3],
    euclidean_distance: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Analyze(args) => run_analyze(args, cli.verbose),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "skel=debug" } else { "skel=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_analyze(args: AnalyzeArgs, verbose: bool) -> Result<()> {
    let (case_dir, truth) = prepare_case(&args.common, "analyze")?;
    let mut skeleton = load_volume_u8(&args.common.input).context("loading skeleton slices")?;
    if let Some(truth) = &truth {
        validate_dims(truth, &skeleton)?;
    }

    let intensity = if args.intensity.is_empty() {
        None
    } else {
        Some(load_intensity(&args.intensity).context("loading intensity slices")?)
    };

    let cfg = AnalyzeConfig {
        prune: args.prune,
        calibration: args.calibration.unwrap_or_default(),
        verbose,
    };
    tracing::info!(
        dims = ?skeleton.dims(),
        prune = %cfg.prune,
        "analyzing skeleton"
    );

    let intensity_view = intensity.as_ref().map(Volume::as_view);
    let analysis = analyze_skeleton(&mut skeleton.as_view_mut(), intensity_view.as_ref(), &cfg)
        .context("analyzing skeleton")?;

    for issue in &analysis.issues {
        tracing::warn!("{issue}");
    }

    write_json(case_dir.join("summary.json"), &summary_dto(&analysis, &skeleton, &cfg))?;
    write_json(case_dir.join("graphs.json"), &graph_dtos(&analysis))?;
    write_json(case_dir.join("branches.json"), &branch_dtos(&analysis))?;

    let tags = analysis.tagging.to_codes();
    save_slices(&case_dir, "tags", &tags)?;
    save_label_slices(&case_dir, &analysis.labels)?;
    if !analysis.pruned.is_empty() {
        save_slices(&case_dir, "pruned", &skeleton)?;
    }

    if let Some(truth) = &truth {
        validate_counts(truth, &analysis)?;
    }

    tracing::info!(
        trees = analysis.num_trees(),
        branches = analysis.total_branches(),
        pruned = analysis.pruned.len(),
        out = %case_dir.display(),
        "wrote analysis"
    );
    Ok(())
}

fn summary_dto(analysis: &SkeletonAnalysis, skeleton: &Volume<u8>, cfg: &AnalyzeConfig) -> SummaryDto {
    let per_tree: Vec<TreeStatsDto> = analysis
        .stats
        .iter()
        .map(|s| TreeStatsDto {
            tree: s.tree,
            branches: s.branches,
            junctions: s.junctions,
            end_points: s.end_points,
            junction_voxels: s.junction_voxels,
            slabs: s.slabs,
            voxels: s.num_voxels(),
            triple_points: s.triple_points,
            quadruple_points: s.quadruple_points,
            average_branch_length: s.average_branch_length,
            maximum_branch_length: s.maximum_branch_length,
        })
        .collect();

    let cal = &cfg.calibration;
    SummaryDto {
        width: skeleton.width(),
        height: skeleton.height(),
        depth: skeleton.depth(),
        calibration: [cal.sx(), cal.sy(), cal.sz()],
        prune: cfg.prune.to_string(),
        trees: analysis.num_trees(),
        branches: analysis.total_branches(),
        junctions: analysis.total_junctions(),
        end_points: analysis.tagging.end_points.len(),
        junction_voxels: analysis.tagging.junctions.len(),
        slabs: analysis.tagging.slabs.len(),
        total_length: analysis.total_length(),
        starting_slabs: analysis
            .starting_slabs()
            .into_iter()
            .map(|p| [p.x, p.y, p.z])
            .collect(),
        pruned: analysis.pruned.iter().map(|p| [p.x, p.y, p.z]).collect(),
        issues: analysis.issues.iter().map(ToString::to_string).collect(),
        per_tree,
    }
}

fn graph_dtos(analysis: &SkeletonAnalysis) -> Vec<GraphDto> {
    analysis
        .trees
        .iter()
        .zip(&analysis.graphs)
        .map(|(tree, graph)| GraphDto {
            tree: tree.id,
            root: graph.root,
            vertices: graph
                .vertices
                .iter()
                .map(|v| VertexDto {
                    id: v.id,
                    kind: vertex_kind_name(v.kind),
                    points: v.points.iter().map(|p| [p.x, p.y, p.z]).collect(),
                })
                .collect(),
            edges: graph
                .edges
                .iter()
                .map(|e| EdgeDto {
                    id: e.id,
                    v1: e.v1,
                    v2: e.v2,
                    length: e.length,
                    slabs: e.slabs.iter().map(|p| [p.x, p.y, p.z]).collect(),
                })
                .collect(),
        })
        .collect()
}

fn branch_dtos(analysis: &SkeletonAnalysis) -> Vec<BranchDto> {
    analysis
        .branch_table()
        .into_iter()
        .map(|b| BranchDto {
            tree: b.tree,
            length: b.length,
            v1: b.v1,
            v2: b.v2,
            euclidean_distance: b.euclidean_distance,
        })
        .collect()
}

fn prepare_case(common: &CommonArgs, case_name: &str) -> Result<(PathBuf, Option<TruthEnvelope>)> {
    for path in &common.input {
        ensure_file_exists(path, "input")?;
    }

    let truth = match &common.truth {
        Some(path) => {
            ensure_file_exists(path, "truth")?;
            let truth: TruthEnvelope = read_json(path)
                .with_context(|| format!("reading truth json at {}", path.display()))?;
            if truth.case != case_name {
                bail!(
                    "truth case mismatch: expected '{}', got '{}'.",
                    case_name,
                    truth.case
                );
            }
            Some(truth)
        }
        None => None,
    };

    let case_dir = common.out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;

    if let Some(path) = &common.truth {
        fs::copy(path, case_dir.join("truth.json")).with_context(|| {
            format!(
                "copying truth {} -> {}",
                path.display(),
                case_dir.join("truth.json").display()
            )
        })?;
    }

    Ok((case_dir, truth))
}

fn parse_calibration(s: &str) -> Result<Calibration, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid spacing in '{s}': {e}"))?;
    let [sx, sy, sz] = parts[..] else {
        return Err(format!("expected three spacings sx,sy,sz, got '{s}'"));
    };
    Calibration::new(sx, sy, sz).map_err(|e| e.to_string())
}

/// Stacks equally sized slices into one volume, first slice at z = 0.
fn stack_slices<T: Clone>(slices: Vec<(u32, u32, Vec<T>)>) -> Result<Volume<T>> {
    let Some(&(w, h, _)) = slices.first() else {
        bail!("no slices given");
    };
    let depth = slices.len();
    let mut data = Vec::with_capacity(w as usize * h as usize * depth);
    for (z, (sw, sh, slice)) in slices.into_iter().enumerate() {
        if (sw, sh) != (w, h) {
            bail!("slice {z} is {sw}x{sh}, expected {w}x{h}");
        }
        data.extend(slice);
    }
    Volume::from_vec(w as usize, h as usize, depth, data).context("constructing volume from slices")
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("opening input image {}", path.display()))
}

fn load_volume_u8(paths: &[PathBuf]) -> Result<Volume<u8>> {
    let slices = paths
        .iter()
        .map(|p| {
            let luma = open_image(p)?.to_luma8();
            let (w, h) = luma.dimensions();
            Ok((w, h, luma.into_raw()))
        })
        .collect::<Result<Vec<_>>>()?;
    stack_slices(slices)
}

fn load_intensity(paths: &[PathBuf]) -> Result<Volume<f32>> {
    let images = paths.iter().map(|p| open_image(p)).collect::<Result<Vec<_>>>()?;
    let wide = images.iter().any(|img| {
        matches!(
            img,
            DynamicImage::ImageLuma16(_)
                | DynamicImage::ImageLumaA16(_)
                | DynamicImage::ImageRgb16(_)
                | DynamicImage::ImageRgba16(_)
        )
    });

    if wide {
        let slices = images
            .into_iter()
            .map(|img| {
                let luma = img.to_luma16();
                let (w, h) = luma.dimensions();
                (w, h, luma.into_raw())
            })
            .collect();
        Ok(to_f32_u16(&stack_slices(slices)?.as_view()))
    } else {
        let slices = images
            .into_iter()
            .map(|img| {
                let luma = img.to_luma8();
                let (w, h) = luma.dimensions();
                (w, h, luma.into_raw())
            })
            .collect();
        Ok(to_f32(&stack_slices(slices)?.as_view()))
    }
}

fn validate_dims(truth: &TruthEnvelope, vol: &Volume<u8>) -> Result<()> {
    if (truth.width, truth.height, truth.depth) != vol.dims() {
        bail!(
            "truth dimensions ({}, {}, {}) do not match input dimensions {:?}.",
            truth.width,
            truth.height,
            truth.depth,
            vol.dims()
        );
    }
    Ok(())
}

fn validate_counts(truth: &TruthEnvelope, analysis: &SkeletonAnalysis) -> Result<()> {
    let expected: ExpectedCounts = if truth.truth.is_null() {
        ExpectedCounts::default()
    } else {
        serde_json::from_value(truth.truth.clone())
            .with_context(|| format!("parsing expected counts for case '{}'", truth.case))?
    };

    let checks = [
        ("trees", expected.trees, analysis.num_trees()),
        ("branches", expected.branches, analysis.total_branches()),
        ("junctions", expected.junctions, analysis.total_junctions()),
        ("end_points", expected.end_points, analysis.tagging.end_points.len()),
    ];
    for (what, want, got) in checks {
        if let Some(want) = want
            && want != got
        {
            bail!("truth {what} mismatch: expected {want}, got {got}.");
        }
    }
    Ok(())
}

fn save_slices(dir: &Path, prefix: &str, vol: &Volume<u8>) -> Result<()> {
    let view = vol.as_view();
    for z in 0..vol.depth() {
        save_luma_raw(
            dir.join(format!("{prefix}_z{z:03}.png")),
            vol.width(),
            vol.height(),
            view.slice(z).to_vec(),
        )?;
    }
    Ok(())
}

fn save_label_slices(dir: &Path, labels: &Volume<u16>) -> Result<()> {
    let view = labels.as_view();
    for z in 0..labels.depth() {
        let path = dir.join(format!("labels_z{z:03}.png"));
        let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(
            labels.width() as u32,
            labels.height() as u32,
            view.slice(z).to_vec(),
        )
        .context("constructing 16-bit label image from raw data")?;
        img.save(&path)
            .with_context(|| format!("saving image {}", path.display()))?;
    }
    Ok(())
}

fn save_luma_raw(path: PathBuf, width: usize, height: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(width as u32, height as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn vertex_kind_name(kind: VertexKind) -> &'static str {
    match kind {
        VertexKind::EndPoint => "EndPoint",
        VertexKind::Junction => "Junction",
        VertexKind::LoopAnchor => "LoopAnchor",
    }
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_calibration, stack_slices};

    #[test]
    fn calibration_argument() {
        let cal = parse_calibration("0.5, 0.5,2").expect("calibration");
        assert_eq!((cal.sx(), cal.sy(), cal.sz()), (0.5, 0.5, 2.0));
        assert!(parse_calibration("1,1").is_err());
        assert!(parse_calibration("1,x,1").is_err());
        assert!(parse_calibration("1,0,1").is_err());
    }

    #[test]
    fn slices_stack_along_z() {
        let vol = stack_slices(vec![(2, 1, vec![1u8, 2]), (2, 1, vec![3, 4])]).expect("stack");
        assert_eq!(vol.dims(), (2, 1, 2));
        assert_eq!(vol.data(), &[1, 2, 3, 4]);

        assert!(stack_slices(vec![(2, 1, vec![1u8, 2]), (1, 1, vec![3])]).is_err());
        assert!(stack_slices::<u8>(Vec::new()).is_err());
    }
}
