use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Seek, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use mesh_kernel::mesh::Mesh;
use splitter::{planes::CutCounts, session::SliceSession};

#[derive(Debug, Parser)]
/// Splits meshes into contiguous parts by cutting them with evenly spaced
/// axis-aligned planes across their shared bounding box.
struct Args {
    #[arg(long, required = true)]
    /// Path to a .stl file. Can be passed multiple times; all meshes share
    /// one bounding box and are cut by the same planes.
    mesh: Vec<PathBuf>,

    #[arg(short, long, default_value_t = 1)]
    /// Number of cuts along the x axis. N cuts give N + 1 slabs across the
    /// bounding box.
    x_cuts: u32,
    #[arg(short, long, default_value_t = 1)]
    /// Number of cuts along the y axis.
    y_cuts: u32,
    #[arg(short, long, default_value_t = 1)]
    /// Number of cuts along the z axis.
    z_cuts: u32,

    #[arg(long)]
    /// Transfer each input's original shading normals back onto its
    /// fragments after cutting.
    preserve_normals: bool,

    /// Directory the fragment .stl files are written to.
    output: PathBuf,
}

fn main() -> Result<()> {
    let filter = filter::Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("splitter", LevelFilter::TRACE)
        .with_target("mesh_kernel", LevelFilter::TRACE);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut meshes = Vec::new();
    for path in &args.mesh {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mesh = load_stl(BufReader::new(file))
            .with_context(|| format!("loading {}", path.display()))?;

        println!(
            "Loaded `{}`. {{ vert: {}, face: {} }}",
            path.file_name().unwrap().to_string_lossy(),
            mesh.vertex_count(),
            mesh.face_count()
        );
        meshes.push(mesh);
    }

    let now = Instant::now();
    let cuts = CutCounts::new(args.x_cuts, args.y_cuts, args.z_cuts);
    let session = SliceSession::new(meshes, cuts, args.preserve_normals);
    let fragments = session.run()?;

    fs::create_dir_all(&args.output)?;
    for (index, fragment) in fragments.iter().enumerate() {
        let path = args.output.join(format!("fragment_{index:03}.stl"));
        write_stl(&path, fragment).with_context(|| format!("writing {}", path.display()))?;
    }

    println!(
        "Done. {} fragments in {:.1}s",
        fragments.len(),
        now.elapsed().as_secs_f32()
    );

    Ok(())
}

/// Loads a .stl into a mesh, deriving shading normals from the faces since
/// the format has no per-vertex normals of its own.
fn load_stl<T: Read + Seek>(mut reader: T) -> Result<Mesh> {
    let stl = stl_io::read_stl(&mut reader)?;

    let vertices = stl
        .vertices
        .iter()
        .map(|v| splitter::Pos::new(v[0], v[1], v[2]))
        .collect();
    let faces = stl
        .faces
        .iter()
        .map(|f| f.vertices.map(|i| i as u32))
        .collect();

    Ok(Mesh::with_computed_normals(vertices, faces))
}

fn write_stl(path: &Path, mesh: &Mesh) -> Result<()> {
    let triangles = (0..mesh.face_count()).map(|face| {
        let [v0, v1, v2] = mesh.face_verts(face);
        let normal = mesh.face_normal(face);

        stl_io::Triangle {
            normal: stl_io::Normal::new([normal.x, normal.y, normal.z]),
            vertices: [v0, v1, v2].map(|v| stl_io::Vertex::new([v.x, v.y, v.z])),
        }
    });

    let mut writer = BufWriter::new(File::create(path)?);
    stl_io::write_stl(&mut writer, triangles)?;
    writer.flush()?;

    Ok(())
}
