//! Headless output as whitespace-separated data files with gnuplot scripts.
//!
//! Frames of the packet are separated by two blank lines so gnuplot can pick
//! them with `index`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::simulation::reference::Reference;
use crate::simulation::states::{PacketSamples, TrajectorySet};

pub const PACKET_DATA: &str = "packet.dat";
pub const TRAJECTORY_DATA: &str = "trajectories.dat";
pub const REFERENCE_DATA: &str = "reference.dat";

/// `packet.dat` holds one `x re im abs` block per frame
pub fn write_packet(dir: &Path, samples: &PacketSamples) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let mut data = BufWriter::new(File::create(dir.join(PACKET_DATA))?);
    for (j, t) in samples.times.iter().enumerate() {
        writeln!(data, "# t = {t}")?;
        for (i, x) in samples.positions.points().iter().enumerate() {
            let psi = samples.values[(i, j)];
            writeln!(data, "{} {} {} {}", x, psi.re, psi.im, psi.norm())?;
        }
        writeln!(data)?;
        writeln!(data)?;
    }
    data.flush()?;

    let last = samples.times.len().saturating_sub(1);
    let mut script = File::create(dir.join("packet.gnuplot"))?;
    writeln!(script, "set xlabel \"x\"")?;
    writeln!(script, "do for [i=0:{last}] {{")?;
    writeln!(
        script,
        "    plot \"{PACKET_DATA}\" u 1:2 i i t \"Re\" w l, \"{PACKET_DATA}\" u 1:3 i i t \"Im\" w l, \"{PACKET_DATA}\" u 1:4 i i t \"|psi|\" w l lw 2"
    )?;
    writeln!(script, "    pause 0.02")?;
    writeln!(script, "}}")?;

    log::info!(
        "write_packet: {} frames x {} points -> {}",
        samples.times.len(),
        samples.positions.len(),
        dir.display()
    );
    Ok(())
}

/// `trajectories.dat` is `t x_1 .. x_n`; `reference.dat` is
/// `t centroid lower upper ref_1 .. ref_n`
pub fn write_trajectories(dir: &Path, set: &TrajectorySet, reference: &Reference) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let mut data = BufWriter::new(File::create(dir.join(TRAJECTORY_DATA))?);
    for (j, t) in set.times.points().iter().enumerate() {
        write!(data, "{t}")?;
        for x in set.positions.column(j).iter() {
            write!(data, " {x}")?;
        }
        writeln!(data)?;
    }
    data.flush()?;

    let mut analytic = BufWriter::new(File::create(dir.join(REFERENCE_DATA))?);
    for &t in set.times.points() {
        let band = reference.band(t);
        write!(analytic, "{} {} {} {}", t, band.centroid, band.lower, band.upper)?;
        for &xi in &set.initial {
            write!(analytic, " {}", reference.trajectory(xi, t))?;
        }
        writeln!(analytic)?;
    }
    analytic.flush()?;

    let n = set.count();
    let mut curves = vec![
        format!("\"{REFERENCE_DATA}\" u 1:2 t \"centroid\" w l lc rgb \"black\""),
        format!("\"{REFERENCE_DATA}\" u 1:3 t \"centroid - width\" w l dt 2 lc rgb \"gray\""),
        format!("\"{REFERENCE_DATA}\" u 1:4 t \"centroid + width\" w l dt 2 lc rgb \"gray\""),
    ];
    curves.extend((0..n).map(|i| {
        format!("\"{TRAJECTORY_DATA}\" u 1:{} notitle w l lc rgb \"blue\"", i + 2)
    }));
    curves.extend((0..n).map(|i| {
        format!("\"{REFERENCE_DATA}\" u 1:{} notitle w l dt 3 lc rgb \"orange\"", i + 5)
    }));

    let mut script = File::create(dir.join("trajectories.gnuplot"))?;
    writeln!(script, "set xlabel \"t\"")?;
    writeln!(script, "set ylabel \"x\"")?;
    writeln!(script, "plot {}", curves.join(", "))?;

    log::info!(
        "write_trajectories: {} trajectories x {} samples -> {}",
        n,
        set.times.len(),
        dir.display()
    );
    Ok(())
}
