use anyhow::{anyhow, bail, Context};
use config::{Config, File};
use gridline::{
    timed, Cone, Cylinder, HexagonalConfig, HexagonalLattice, Herringbone,
    LineSet, Parallelepiped, PolarConfig, PolarLattice, RectangularConfig,
    RectangularLattice, RenderSettings, Renderer, RendererRegistry, Rhombus,
    SharedRenderer, Shape, Sphere, SphericalConfig, SphericalLattice,
};
use indexmap::IndexMap;
use log::{info, LevelFilter};
use serde::{Deserialize, Serialize};
use simple_logger::SimpleLogger;
use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    process,
    rc::Rc,
};
use structopt::StructOpt;
use strum::{Display, EnumString};
use validator::Validate;

/// CLI for drawing lattices with gridline.
#[derive(Debug, StructOpt)]
#[structopt(name = "gridline")]
struct Opt {
    /// Path to a scene file that defines the lattices and shapes to draw.
    /// Supported formats: JSON, TOML
    #[structopt(short, long)]
    config: PathBuf,

    /// If given, the drawn lines will be saved to this directory. The exact
    /// files that appear in the directory are defined by the output formats.
    /// See `--output-formats` for more info
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// The format(s) to output the lines in. Supported formats:
    ///
    /// cfg - The full scene, with every default filled in, in TOML format
    ///
    /// json - Every renderer's line set, in priority order, as JSON
    ///
    /// svg - Top-down 2D drawing of every renderer's lines
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// The logging level to use. See
    /// https://docs.rs/log/0.4/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Files that can be written to the output dir. The help text on
/// `Opt::output_formats` lists these too.
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    /// The loaded scene, re-serialized
    Cfg,
    /// Line endpoints as JSON
    Json,
    /// Top-down SVG rendering
    Svg,
}

impl OutputFormat {
    fn file_ext(self) -> &'static str {
        match self {
            Self::Cfg => "toml",
            Self::Json => "json",
            Self::Svg => "svg",
        }
    }
}

/// A lattice definition from the scene file
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LatticeConfig {
    Rectangular(RectangularConfig),
    Hexagonal(HexagonalConfig),
    Polar(PolarConfig),
    Spherical(SphericalConfig),
}

/// A shape definition from the scene file
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeConfig {
    Parallelepiped(Parallelepiped),
    Herringbone(Herringbone),
    Rhombus(Rhombus),
    Cone(Cone),
    Cylinder(Cylinder),
    Sphere(Sphere),
}

impl ShapeConfig {
    fn name(&self) -> &'static str {
        match self {
            Self::Parallelepiped(_) => Parallelepiped::NAME,
            Self::Herringbone(_) => Herringbone::NAME,
            Self::Rhombus(_) => Rhombus::NAME,
            Self::Cone(_) => Cone::NAME,
            Self::Cylinder(_) => Cylinder::NAME,
            Self::Sphere(_) => Sphere::NAME,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct RendererConfig {
    /// Name of a lattice from the scene's `lattices` table
    lattice: String,
    // Settings go first so scalars serialize ahead of the shape table
    #[serde(flatten)]
    settings: RenderSettings,
    shape: ShapeConfig,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct SceneConfig {
    lattices: IndexMap<String, LatticeConfig>,
    renderers: Vec<RendererConfig>,
}

/// A lattice built from the scene, ready to be shared between renderers
enum SharedLattice {
    Rectangular(Rc<RefCell<RectangularLattice>>),
    Hexagonal(Rc<RefCell<HexagonalLattice>>),
    Polar(Rc<RefCell<PolarLattice>>),
    Spherical(Rc<RefCell<SphericalLattice>>),
}

impl SharedLattice {
    fn build(config: &LatticeConfig) -> anyhow::Result<Self> {
        Ok(match config {
            LatticeConfig::Rectangular(config) => Self::Rectangular(shared(
                RectangularLattice::new(*config),
            )),
            LatticeConfig::Hexagonal(config) => {
                Self::Hexagonal(shared(HexagonalLattice::new(*config)))
            }
            LatticeConfig::Polar(config) => {
                Self::Polar(shared(PolarLattice::new(*config)?))
            }
            LatticeConfig::Spherical(config) => {
                Self::Spherical(shared(SphericalLattice::new(*config)?))
            }
        })
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Rectangular(_) => "rectangular",
            Self::Hexagonal(_) => "hexagonal",
            Self::Polar(_) => "polar",
            Self::Spherical(_) => "spherical",
        }
    }
}

fn shared<T>(value: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(value))
}

fn renderer<S: Shape + 'static>(
    lattice: &Rc<RefCell<S::Lattice>>,
    shape: S,
    settings: RenderSettings,
) -> SharedRenderer {
    shared(Renderer::new(Rc::clone(lattice), shape, settings))
}

/// Attach a shape to its lattice. The shape has to match the lattice type.
fn build_renderer(
    lattice: &SharedLattice,
    config: &RendererConfig,
) -> anyhow::Result<SharedRenderer> {
    let settings = config.settings;
    Ok(match (&config.shape, lattice) {
        (ShapeConfig::Parallelepiped(shape), SharedLattice::Rectangular(l)) => {
            renderer(l, *shape, settings)
        }
        (ShapeConfig::Herringbone(shape), SharedLattice::Hexagonal(l)) => {
            renderer(l, *shape, settings)
        }
        (ShapeConfig::Rhombus(shape), SharedLattice::Hexagonal(l)) => {
            renderer(l, *shape, settings)
        }
        (ShapeConfig::Cone(shape), SharedLattice::Hexagonal(l)) => {
            shape.validate().context("invalid cone")?;
            renderer(l, *shape, settings)
        }
        (ShapeConfig::Cylinder(shape), SharedLattice::Polar(l)) => {
            renderer(l, *shape, settings)
        }
        (ShapeConfig::Sphere(shape), SharedLattice::Spherical(l)) => {
            renderer(l, *shape, settings)
        }
        (shape, lattice) => bail!(
            "{} shape can't be drawn on {} lattice {:?}",
            shape.name(),
            lattice.name(),
            config.lattice
        ),
    })
}

fn load_config(config_path: &Path) -> anyhow::Result<SceneConfig> {
    let mut settings = Config::new();
    let config_path = config_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", config_path)
    })?;
    settings
        .merge(File::with_name(config_path))
        .context("error reading config file")?;
    settings.try_into().context("error reading config")
}

/// Build every lattice and renderer in the scene and register the renderers
fn build_scene(scene: &SceneConfig) -> anyhow::Result<RendererRegistry> {
    let mut lattices = IndexMap::new();
    for (name, config) in &scene.lattices {
        let lattice = SharedLattice::build(config)
            .with_context(|| format!("invalid lattice {:?}", name))?;
        lattices.insert(name.as_str(), lattice);
    }

    let mut registry = RendererRegistry::new();
    for (i, config) in scene.renderers.iter().enumerate() {
        let lattice = lattices.get(config.lattice.as_str()).ok_or_else(|| {
            anyhow!("renderer {} uses unknown lattice {:?}", i, config.lattice)
        })?;
        let renderer = build_renderer(lattice, config)
            .with_context(|| format!("invalid renderer {}", i))?;
        registry.register(renderer);
    }
    Ok(registry)
}

/// Render the scene or its lines in one output format
fn render_output(
    format: OutputFormat,
    scene: &SceneConfig,
    line_sets: &[LineSet],
) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Cfg => {
            toml::to_string_pretty(scene).context("error serializing scene")?
        }
        OutputFormat::Json => {
            let sets = line_sets
                .iter()
                .map(gridline::to_json)
                .collect::<anyhow::Result<Vec<_>>>()?;
            format!("[{}]", sets.join(","))
        }
        OutputFormat::Svg => {
            let sets = line_sets.iter().collect::<Vec<_>>();
            gridline::to_svg(&sets).to_string()
        }
    })
}

/// Write `lines.<ext>` into the output dir for each requested format
fn write_outputs(
    output_dir: &Path,
    formats: &[OutputFormat],
    scene: &SceneConfig,
    line_sets: &[LineSet],
) -> anyhow::Result<()> {
    if formats.is_empty() {
        bail!("--output was given without any --output-formats")
    }
    fs::create_dir_all(output_dir).with_context(|| {
        format!("error creating output dir {:?}", output_dir)
    })?;

    for &format in formats {
        let path = output_dir.join("lines").with_extension(format.file_ext());
        timed!(format!("Writing {} to {:?}", format, &path), {
            let contents = render_output(format, scene, line_sets)?;
            fs::write(&path, contents)
                .with_context(|| format!("error writing {:?}", &path))?;
        });
    }
    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let scene = load_config(&opt.config)?;
    let mut registry = build_scene(&scene)?;

    let mut line_sets = Vec::new();
    let drawn = timed!("Drawing scene", log::Level::Info, {
        registry.draw(|lines| line_sets.push(lines.clone()))
    });
    let segments: usize = line_sets.iter().map(LineSet::len).sum();
    info!(
        "Drew {} of {} renderers, {} segments",
        drawn,
        registry.len(),
        segments
    );

    match &opt.output {
        Some(output_dir) => {
            write_outputs(output_dir, &opt.output_formats, &scene, &line_sets)
        }
        None => Ok(()),
    }
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
