#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("wingdv_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fmt::Write as _;
    use std::fs;

    use wingdv_engine::Engine;
    use wingdv_engine::assembly::{AssemblyOptions, GeometryMode, NamedShape};
    use wingdv_engine::geom::crm_reference_mesh;
    use wingdv_engine::graph::value::Value;

    const USAGE: &str = r#"wingdv_cli (wingdv-engine)

USAGE:
  wingdv_cli mesh
  wingdv_cli graph <file> [options]
  wingdv_cli evaluate <file>

COMMANDS:
  mesh        Print the CRM reference mesh (leading and trailing edge)
  graph       Assemble the design-variable graph and print nodes, wires and ports
  evaluate    Assemble, evaluate and print the exposed port values

OPTIONS (graph):
  --disconnected     Leave free variables unconnected for an external driver
  --ffd <label>      Assemble for a free-form deformation handle
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "mesh" => {
                print!("{}", render_mesh());
                Ok(())
            }
            "graph" => cmd_graph(&mut args),
            "evaluate" => cmd_evaluate(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn render_mesh() -> String {
        let mesh = crm_reference_mesh();
        let [rows, stations, dims] = mesh.shape();
        let mut out = format!("shape: ({rows}, {stations}, {dims})\n");
        for (station, (le, te)) in mesh
            .leading_edge()
            .iter()
            .zip(mesh.trailing_edge())
            .enumerate()
        {
            let _ = writeln!(
                out,
                "{station:>3}  LE ({:>10.3}, {:>10.3}, {:>8.3})  TE ({:>10.3}, {:>10.3}, {:>8.3})",
                le[0], le[1], le[2], te[0], te[1], te[2]
            );
        }
        out
    }

    fn cmd_graph(args: &mut Args) -> Result<(), String> {
        let path = args.next().ok_or("missing surface file")?;

        let mut options = AssemblyOptions::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--disconnected" => options.connect_free_variables = false,
                "--ffd" => {
                    options.mode = GeometryMode::free_form(NamedShape(args.value("--ffd")?));
                }
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`")),
            }
        }

        let engine = load(&path, &options)?;
        for loaded in engine.surfaces() {
            let dv_graph = &loaded.graph;
            let graph = dv_graph.graph();
            println!("surface `{}`", dv_graph.surface());
            if let Some(label) = dv_graph.shape_label() {
                println!("  ffd handle: {label}");
            }

            println!("  nodes:");
            for node in graph.nodes() {
                println!(
                    "    {:>2}  {:<20} {}",
                    node.id.0,
                    node.label(),
                    node.name.as_deref().unwrap_or("")
                );
            }

            println!("  wires:");
            for wire in graph.wires() {
                println!("    {wire}");
            }

            println!("  ports:");
            for port in dv_graph.ports() {
                println!(
                    "    {:<18} {:<24} units={:<4} free={} interpolated={}",
                    port.name,
                    port.shape.to_string(),
                    port.units.unwrap_or("-"),
                    port.free,
                    port.interpolated
                );
            }
        }
        Ok(())
    }

    fn cmd_evaluate(args: &mut Args) -> Result<(), String> {
        let path = args.next().ok_or("missing surface file")?;
        let mut engine = load(&path, &AssemblyOptions::default())?;

        let values = engine.evaluate_ports().map_err(|err| err.to_string())?;
        for (surface, ports) in values {
            println!("surface `{surface}`");
            for (port, value) in ports {
                println!("  {port:<18} {}", render_value(value));
            }
        }
        Ok(())
    }

    fn load(path: &str, options: &AssemblyOptions) -> Result<Engine, String> {
        let xml = fs::read_to_string(path).map_err(|err| format!("read `{path}`: {err}"))?;
        let mut engine = Engine::new();
        engine
            .load_surface_with(&xml, options)
            .map_err(|err| format!("{path}: {err}"))?;
        Ok(engine)
    }

    fn render_value(value: &Value) -> String {
        match value {
            Value::List(values) => {
                let mut out = String::from("[");
                for (idx, item) in values.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    match item {
                        Value::Number(number) => {
                            let _ = write!(out, "{number:.4}");
                        }
                        other => out.push_str(&other.to_string()),
                    }
                }
                out.push(']');
                out
            }
            other => other.to_string(),
        }
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
