//! Drives a `WebUi` against an in-memory peer: remote commands come in
//! over the loopback transport, local mutations go out as `set`
//! documents.

use clap::Parser;
use webui::transport::{LoopbackPeer, LoopbackTransport};
use webui::{Builder, Color, Param, WebUi};

#[derive(Parser, Debug)]
#[command(about = "Loopback demo for the webui parameter sync layer")]
struct Args {
    /// Port the (in-memory) transport pretends to listen on
    #[arg(short, long, default_value_t = 9002)]
    port: u16,
}

fn show_traffic(label: &str, peer: &LoopbackPeer) {
    for doc in peer.drain() {
        println!("{label}:>> {doc}");
    }
}

fn main() -> webui::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();
    let args = Args::parse();

    let (transport, peer) = LoopbackTransport::pair();
    let mut ui = WebUi::builder(transport)
        .with_sync_on_connect(true)
        .build()?;

    let radius = Param::new(0.5_f32);
    let label = Param::new("untitled".to_string());
    let tint = Param::new(Color::new(1.0, 0.4, 0.0));
    let fruits = Param::new(vec!["apple".to_string(), "pear".to_string()]);

    ui.bind("radius", &radius)?;
    ui.bind("label", &label)?;
    ui.bind("tint", &tint)?;
    ui.bind("fruits", &fruits)?;
    ui.listen(args.port)?;

    // A browser connects: every binding is pushed once.
    peer.connect();
    ui.update();
    show_traffic("Pushed", &peer);

    // The remote edits some widgets.
    peer.send(r#"{"set": {"radius": 0.8, "label": "demo"}}"#);
    peer.send(r#"{"select": {"fruits": "pear"}}"#);
    ui.update();
    println!(
        "Local state: radius={} label={:?} selected={:?}",
        radius.get(),
        label.get(),
        fruits.get_selected()
    );
    show_traffic("Echoed (should be empty)", &peer);

    // The host animates a value: one outbound set per mutation.
    for _ in 0..3 {
        radius.add(0.05);
        ui.update();
    }
    show_traffic("Animated", &peer);

    // Hostile input is contained.
    peer.send("{not json");
    peer.send(r#"{"get": "unknown_name"}"#);
    peer.send(r#"{"get": "radius"}"#);
    ui.update();
    show_traffic("Replied", &peer);

    Ok(())
}
