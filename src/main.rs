use std::env;
use std::process::ExitCode;

use exactdie::{evaluate, lex, Pmf, Value};

// Fixed plot size; probing the terminal is out of scope here.
const PLOT_WIDTH: usize = 64;
const PLOT_HEIGHT: usize = 16;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("usage: exactdie EXPRESSION");
        eprintln!("  e.g. exactdie '2d6 + 3', exactdie 'adv(1d20) >= 15', exactdie 4d6k3");
        return ExitCode::FAILURE;
    }
    let input = args.join(" ");
    match lex(&input).and_then(|tokens| evaluate(&tokens)) {
        Ok(Value::Scalar(v)) => println!("answer is always {v}"),
        Ok(Value::Dist(pmf)) => plot(&pmf),
        Ok(other) => unreachable!("literal escaped the evaluator: {other:?}"),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn plot(pmf: &Pmf) {
    let (mean, stdev) = stats(pmf);
    println!("Average: {mean:.15}, Standard deviation: {stdev:.15}");

    // One column per support point, or binned by column maxima when the
    // support is wider than the plot.
    let step = pmf.len().div_ceil(PLOT_WIDTH);
    let columns: Vec<f64> = pmf
        .probs()
        .chunks(step)
        .map(|bin| bin.iter().cloned().fold(0.0, f64::max))
        .collect();
    let peak = columns.iter().cloned().fold(0.0, f64::max);
    let heights: Vec<f64> = columns
        .iter()
        .map(|&p| p / peak * PLOT_HEIGHT as f64)
        .collect();

    let border = format!("+{}+", "-".repeat(columns.len()));
    println!("{border}");
    for (count, r) in (0..PLOT_HEIGHT).rev().enumerate() {
        let threshold = r as f64;
        let mut line = String::with_capacity(columns.len() + 2);
        line.push('|');
        for &h in &heights {
            line.push(if h >= threshold + 2.0 / 3.0 {
                '@'
            } else if h >= threshold + 1.0 / 3.0 {
                'x'
            } else if h >= threshold + 0.1 {
                '_'
            } else {
                ' '
            });
        }
        line.push('|');
        if count % 5 == 0 || r == 0 {
            let label = peak * threshold / (PLOT_HEIGHT - 1) as f64;
            println!("{line}{label:.9}");
        } else {
            println!("{line}");
        }
    }
    println!("{border}");

    let left = pmf.offset().to_string();
    let right = pmf.max_value().to_string();
    let total = columns.len() + 2;
    if left.len() + right.len() < total {
        println!("{left}{}{right}", " ".repeat(total - left.len() - right.len()));
    } else {
        println!("{left}..{right}");
    }
}

// Weighted incremental mean and standard deviation over the PMF.
fn stats(pmf: &Pmf) -> (f64, f64) {
    let mut mean = 0.0;
    let mut s = 0.0;
    let mut weight_sum = 0.0;
    for (x, w) in pmf.iter() {
        if w == 0.0 {
            continue;
        }
        weight_sum += w;
        let old = mean;
        mean += (w / weight_sum) * (x as f64 - old);
        s += w * (x as f64 - old) * (x as f64 - mean);
    }
    (mean, (s / weight_sum).sqrt())
}
