// seti-channel-detect
// Copyright (c) 2026 The OpenSETI Channel Detect Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The offline activity: reads a capture file end to end through the DFB, spectrometer,
//! CW/pulse detectors, and super-clusterer/classifier, reporting candidates as it goes.
//! One [`seti_spectrometer::Spectrometer`] instance is built per
//! polarization (each owns its own baseline and CW-power grids; see `DESIGN.md` for why
//! that differs from a single shared instance), since this binary has no concurrent
//! half-frame pipeline to share one across.

use std::fs;

use log::{debug, info, warn};

use seti_archive::{coherent, de_drift, heterodyne, samples_per_block, search, subchannel_window, synthesize, synthesize_spectra, to_power, CoherentResult, PowerPeak};
use seti_assembler::{ChannelState, PacketAssembler};
use seti_cluster::{build_super_clusters, classify, BadBandRecord, BadBandRegistry, CoherentOutcome, FollowUpEntry, Masks, SuperCluster};
use seti_core::dsp::complex::Complex;
use seti_core::errors::{config_error, Result, SetiError};
use seti_core::grids::CdGrid;
use seti_core::ops::OperationFlags;
use seti_core::packet::PolKind;
use seti_core::params::{ActivityParams, BaselineLimits, PerResolutionParams};
use seti_core::signal::{CandidateSignal, CwHit, PulseHit, SignalDescription, SignalKind};
use seti_core::units::{bin_to_hz, drift_bins_to_rate, Hz, Seconds};
use seti_core::Fft;
use seti_cwdetect::{cluster_hits, detect_slope, Slope};
use seti_dfb::Dfb;
use seti_pulsedetect::{cluster_triplets, combine, make_slices, search_slice, PulseTrain, Triplet, TripletParams};
use seti_spectrometer::{ResolutionConfig, Spectrometer};

use crate::cli::Cli;
use crate::traits::{ArchiveSink, CandidateSink, FileCaptureSource, NullArchiveSink, PacketSource, StdoutCandidateSink};

/// Hardcoded domain defaults for the [`ActivityParams`] fields the CLI does not expose.
/// See `DESIGN.md` for the reasoning behind each value.
mod defaults {
    pub const BASELINE_DECAY: f32 = 0.95;
    pub const BASELINE_INIT_ACCUM_HALF_FRAMES: u32 = 4;
    pub const BASELINE_REPORTING_RATE: u32 = 16;
    pub const MAX_PULSES_PER_HALF_FRAME: u32 = 10_000;
    pub const MAX_PULSES_PER_SUBCHANNEL_PER_HALF_FRAME: u32 = 200;
    pub const CW_CLUSTERING_DELTA_BINS: f64 = 2.0;
    pub const PULSE_CLUSTERING_DELTA_BINS: f64 = 2.0;
    pub const SUPER_CLUSTER_GAP_BINS: f64 = 5.0;
    pub const BAD_BAND_CW_PATH_LIMIT: f32 = 8.0;
    pub const BAD_BAND_PULSE_LIMIT: f32 = 400.0;
    pub const BAD_BAND_PULSE_TRIPLET_LIMIT: f32 = 64.0;
    pub const CW_COHERENT_THRESHOLD: f32 = 1e-4;
    pub const SECONDARY_CW_COHERENT_THRESHOLD: f32 = 1e-4;
    pub const SECONDARY_PFA_MARGIN: f32 = 1.0;
    pub const MAX_DIFF_BINS: i32 = 2;
    pub const MAX_DIFF_SPECTRA: i32 = 2;
    pub const MAX_FRAMES: u32 = 1 << 20;
}

/// Run the whole offline activity described by `cli`.
pub fn run(cli: &Cli) -> Result<()> {
    let assembler = assemble_capture(cli)?;
    info!(
        "assembled capture: processed={} missed={} late={} wrong={}",
        assembler.counters.processed, assembler.counters.missed, assembler.counters.late, assembler.counters.wrong
    );

    if cli.probe_only {
        info!("--probe-only: skipping detection pipeline");
        return Ok(());
    }
    if !matches!(assembler.state, ChannelState::Running) {
        warn!("channel never reached Running state; nothing to detect");
        return Ok(());
    }

    let total_samples = assembler.left.len_available() as usize;
    if total_samples == 0 {
        warn!("no samples assembled; nothing to detect");
        return Ok(());
    }

    let mut raw_l = Vec::new();
    let mut raw_r = Vec::new();
    assembler.left.copy_window(0, total_samples, &mut raw_l);
    assembler.right.copy_window(0, total_samples, &mut raw_r);

    let (timelines_l, timelines_r) = run_dfb(cli, &raw_l, &raw_r)?;
    let n_sub = cli.n_sub;
    let timeline_len = timelines_l[0].len();
    if timeline_len < 4 {
        warn!("data-collection window too short to synthesize any spectra");
        return Ok(());
    }

    let (fft_len, n_spectra) = choose_resolution(timeline_len);
    let bin_width_hz = cli.subchannel_bandwidth_hz / fft_len as f64;
    let spectrum_period_s = (fft_len as f64 / 2.0) / cli.subchannel_bandwidth_hz;
    let observation_duration = Seconds(n_spectra as f64 * spectrum_period_s);
    debug!(
        "resolution: fft_len={} n_spectra={} bin_width_hz={:.6} observation_duration={:.3}s",
        fft_len, n_spectra, bin_width_hz, observation_duration.0
    );

    let params = build_activity_params(cli, observation_duration.0, fft_len, bin_width_hz, spectrum_period_s);
    params.validate()?;

    let pulse_threshold = fft_len as f32 * 10.0;
    let triplet_threshold = pulse_threshold * 1.5;
    let p_pulse = (-(pulse_threshold as f64) / fft_len as f64).exp();

    let resolutions = vec![ResolutionConfig { fft_len, n_spectra, pulse_threshold, pack_cw: true, detect_pulses: true }];
    let masked = vec![false; n_sub];

    let mut spectrometer_l = Spectrometer::new(
        n_sub,
        resolutions.clone(),
        defaults::BASELINE_DECAY,
        masked.clone(),
        defaults::MAX_PULSES_PER_SUBCHANNEL_PER_HALF_FRAME,
        defaults::MAX_PULSES_PER_HALF_FRAME,
    );
    let mut spectrometer_r = Spectrometer::new(
        n_sub,
        resolutions,
        defaults::BASELINE_DECAY,
        masked,
        defaults::MAX_PULSES_PER_SUBCHANNEL_PER_HALF_FRAME,
        defaults::MAX_PULSES_PER_HALF_FRAME,
    );

    let mut cd_grid_l = CdGrid::new(n_sub, timeline_len, 1);
    let mut cd_grid_r = CdGrid::new(n_sub, timeline_len, 1);
    let mut pulse_hits: Vec<PulseHit> = Vec::new();
    let mut bad_bands = BadBandRegistry::new();

    for sub in 0..n_sub {
        let mut cd_buf = Vec::new();
        let mut local_hits = Vec::new();
        spectrometer_l.process_subchannel(sub, PolKind::Left, timelines_l[sub].clone(), &mut cd_buf, &mut local_hits)?;
        offset_pulse_hits(&mut local_hits, sub, fft_len);
        pulse_hits.extend(local_hits);
        cd_grid_l.write_half_frame(sub, 0, &cd_buf);

        let mut cd_buf = Vec::new();
        let mut local_hits = Vec::new();
        spectrometer_r.process_subchannel(sub, PolKind::Right, timelines_r[sub].clone(), &mut cd_buf, &mut local_hits)?;
        offset_pulse_hits(&mut local_hits, sub, fft_len);
        pulse_hits.extend(local_hits);
        cd_grid_r.write_half_frame(sub, 0, &cd_buf);
    }
    if spectrometer_l.pulses_dropped() + spectrometer_r.pulses_dropped() > 0 {
        warn!(
            "pulse caps dropped {} hits (left) / {} hits (right)",
            spectrometer_l.pulses_dropped(),
            spectrometer_r.pulses_dropped()
        );
    }

    let cw_left = run_cw_detection(&spectrometer_l, PolKind::Left, n_sub, fft_len, &params, bin_width_hz, observation_duration, &mut bad_bands);
    let cw_right = run_cw_detection(&spectrometer_r, PolKind::Right, n_sub, fft_len, &params, bin_width_hz, observation_duration, &mut bad_bands);

    let pulse_signals = run_pulse_detection(
        pulse_hits,
        n_sub,
        fft_len,
        n_spectra,
        bin_width_hz,
        spectrum_period_s,
        &params,
        p_pulse,
        triplet_threshold,
        &mut bad_bands,
    );

    let supers = build_super_clusters(vec![cw_left, cw_right, pulse_signals], bin_to_hz(defaults::SUPER_CLUSTER_GAP_BINS, bin_width_hz).0);
    info!("{} super-cluster(s) before classification", supers.len());

    let mut sink = StdoutCandidateSink::default();
    let mut archive_sink = NullArchiveSink::default();
    let masks = Masks::default();
    let mut candidates_so_far = 0u32;

    for sc in &supers {
        let coherent = if sc.is_cw && params.operations.contains(OperationFlags::COHERENT_CWD) {
            run_coherent_redetect(sc, &cd_grid_l, &cd_grid_r, n_sub, cli.subchannel_bandwidth_hz, bin_width_hz, &params, &mut archive_sink)?
        }
        else {
            None
        };
        let candidate: CandidateSignal =
            classify(sc, &params, &masks, &[] as &[FollowUpEntry], &mut candidates_so_far, &bad_bands, observation_duration, true, coherent);
        sink.report(&candidate);
    }

    info!("activity complete: {} candidate(s) reported", sink.reported);
    Ok(())
}

/// Read every packet out of the capture file, size the input ring to hold the whole
/// capture (this binary processes one activity's capture in a single batch rather than
/// streaming, so there is no need for the half-frame buffer pool's alloc/free cycle — see
/// `DESIGN.md`), and feed them through the assembler.
fn assemble_capture(cli: &Cli) -> Result<PacketAssembler> {
    let mut source = FileCaptureSource::open(&cli.capture)?;
    let mut packets = Vec::new();
    while let Some(pkt) = source.next_packet()? {
        packets.push(pkt);
    }
    let first = packets.first().ok_or_else(|| SetiError::Other("capture file contains no packets"))?;
    let packet_len = first.len();
    let source_id = first.source_id;
    let channel_id = first.channel_id;

    let ring_capacity = (packets.len() + 4) * packet_len.max(1);
    let mut assembler = PacketAssembler::new(source_id, channel_id, 0.0, packet_len, false, ring_capacity);
    for pkt in packets {
        assembler.on_packet(pkt)?;
    }
    Ok(assembler)
}

/// Build the DFB filter (a boxcar if no coefficient file was given) and run it to
/// completion over both polarizations' raw baseband, producing per-subchannel time series.
fn run_dfb(cli: &Cli, raw_l: &[Complex], raw_r: &[Complex]) -> Result<(Vec<Vec<Complex>>, Vec<Vec<Complex>>)> {
    let mut dfb_l = build_dfb(cli)?;
    let mut dfb_r = build_dfb(cli)?;
    let n_sub = cli.n_sub;

    let mut timelines_l: Vec<Vec<Complex>> = (0..n_sub).map(|_| Vec::new()).collect();
    let mut timelines_r: Vec<Vec<Complex>> = (0..n_sub).map(|_| Vec::new()).collect();
    let mut out_l: Vec<Vec<Complex>> = (0..n_sub).map(|_| vec![Complex::default(); cli.samples_per_chan]).collect();
    let mut out_r: Vec<Vec<Complex>> = (0..n_sub).map(|_| vec![Complex::default(); cli.samples_per_chan]).collect();

    let threshold = dfb_l.threshold();
    let hop = dfb_l.hop();
    let len = raw_l.len().min(raw_r.len());
    let mut pos = 0usize;
    while pos + threshold <= len {
        dfb_l.iterate(&raw_l[pos..], &mut out_l)?;
        dfb_r.iterate(&raw_r[pos..], &mut out_r)?;
        for sub in 0..n_sub {
            timelines_l[sub].extend_from_slice(&out_l[sub]);
            timelines_r[sub].extend_from_slice(&out_r[sub]);
        }
        pos += hop;
    }
    if timelines_l[0].is_empty() {
        return config_error("capture too short to produce a single DFB output block");
    }
    Ok((timelines_l, timelines_r))
}

fn build_dfb(cli: &Cli) -> Result<Dfb> {
    match &cli.coeff_file {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(SetiError::from)?;
            let coeff_file = seti_proto::coeff_file::parse(&text)
                .map_err(|e| SetiError::Configuration(coeff_file_error_message(&e)))?;
            Dfb::new(&coeff_file.coefficients, coeff_file.foldings, cli.n_sub, coeff_file.overlap, cli.samples_per_chan)
        }
        None => {
            let raw = vec![1.0f64; cli.n_sub];
            Dfb::new(&raw, 1, cli.n_sub, cli.overlap, cli.samples_per_chan)
        }
    }
}

fn coeff_file_error_message(e: &seti_proto::coeff_file::CoeffFileError) -> &'static str {
    use seti_proto::coeff_file::CoeffFileError::*;
    match e {
        MissingField(_) => "coefficient file is missing a required header field",
        BadFieldValue { .. } => "coefficient file has an unparsable header field",
        BadCoefficient { .. } => "coefficient file has an unparsable coefficient line",
        LengthMismatch { .. } => "coefficient file's declared length does not match its body",
    }
}

fn offset_pulse_hits(hits: &mut [PulseHit], sub: usize, fft_len: usize) {
    let base = (sub * fft_len) as u32;
    for h in hits.iter_mut() {
        h.bin += base;
    }
}

/// Largest resolution the accumulated timeline supports: the FFT length is the largest
/// power of two at most `timeline_len` samples and at most 1024 bins. `n_spectra` is the largest power of two whose 50%-overlapped spectra still
/// fit the timeline.
fn choose_resolution(timeline_len: usize) -> (usize, usize) {
    let mut fft_len = 1usize;
    while fft_len * 2 <= timeline_len && fft_len * 2 <= 1024 {
        fft_len *= 2;
    }
    fft_len = fft_len.max(2);
    let hop = fft_len / 2;
    let mut n_spectra = 1usize;
    while fft_len + hop * (n_spectra * 2 - 1) <= timeline_len {
        n_spectra *= 2;
    }
    (fft_len, n_spectra.max(1))
}

fn build_activity_params(cli: &Cli, data_collection_length: f64, fft_len: usize, bin_width_hz: f64, spectrum_period_s: f64) -> ActivityParams {
    let mut per_resolution = PerResolutionParams::default();
    per_resolution.request_pulse_resolution[0] = true;
    per_resolution.pulse_threshold[0] = fft_len as f32 * 10.0;
    per_resolution.triplet_threshold[0] = per_resolution.pulse_threshold[0] * 1.5;
    per_resolution.singlet_threshold[0] = per_resolution.pulse_threshold[0];

    let _ = spectrum_period_s;
    ActivityParams {
        data_collection_length,
        data_collection_frames: ActivityParams::quantize_frames(cli.data_collection_frames, defaults::MAX_FRAMES),
        max_frames: defaults::MAX_FRAMES,
        dadd_resolution: 0,
        dadd_threshold: cli.dadd_threshold,
        per_resolution,
        baseline_init_accum_half_frames: defaults::BASELINE_INIT_ACCUM_HALF_FRAMES,
        baseline_decay: defaults::BASELINE_DECAY,
        baseline_reporting_rate: defaults::BASELINE_REPORTING_RATE,
        baseline_warning_limits: BaselineLimits::default(),
        baseline_error_limits: BaselineLimits::default(),
        max_pulses_per_half_frame: defaults::MAX_PULSES_PER_HALF_FRAME,
        max_pulses_per_subchannel_per_half_frame: defaults::MAX_PULSES_PER_SUBCHANNEL_PER_HALF_FRAME,
        max_number_of_candidates: cli.max_candidates,
        cw_clustering_delta_freq_hz: bin_to_hz(defaults::CW_CLUSTERING_DELTA_BINS, bin_width_hz).0,
        pulse_clustering_delta_freq_hz: bin_to_hz(defaults::PULSE_CLUSTERING_DELTA_BINS, bin_width_hz).0,
        clustering_freq_tolerance_hz: bin_to_hz(defaults::SUPER_CLUSTER_GAP_BINS, bin_width_hz).0,
        bad_band_cw_path_limit: defaults::BAD_BAND_CW_PATH_LIMIT,
        bad_band_pulse_limit: defaults::BAD_BAND_PULSE_LIMIT,
        bad_band_pulse_triplet_limit: defaults::BAD_BAND_PULSE_TRIPLET_LIMIT,
        cw_coherent_threshold: defaults::CW_COHERENT_THRESHOLD,
        secondary_cw_coherent_threshold: defaults::SECONDARY_CW_COHERENT_THRESHOLD,
        secondary_pfa_margin: defaults::SECONDARY_PFA_MARGIN,
        zero_drift_tolerance_hz_per_s: cli.zero_drift_tolerance,
        max_drift_rate_tolerance_hz_per_s: cli.max_drift_rate_tolerance,
        max_diff_bins: defaults::MAX_DIFF_BINS,
        max_diff_spectra: defaults::MAX_DIFF_SPECTRA,
        operations: OperationFlags::BASELINING
            | OperationFlags::POWER_CWD
            | OperationFlags::COHERENT_CWD
            | OperationFlags::PULSE_DETECTION
            | OperationFlags::CANDIDATE_SELECTION
            | OperationFlags::REJECT_ZERO_DRIFT_SIGNALS,
    }
}

/// Run both drift slopes' DADD pass over every subchannel's packed CW grid for one
/// polarization, offset each hit's bin into the global usable-band numbering, and cluster
/// the result into [`SignalDescription`]s sorted ascending by frequency.
#[allow(clippy::too_many_arguments)]
fn run_cw_detection(
    spectrometer: &Spectrometer,
    pol: PolKind,
    n_sub: usize,
    fft_len: usize,
    params: &ActivityParams,
    bin_width_hz: f64,
    observation_duration: Seconds,
    bad_bands: &mut BadBandRegistry,
) -> Vec<SignalDescription> {
    let mut hits: Vec<CwHit> = Vec::new();
    for sub in 0..n_sub {
        let grid = spectrometer.cw_grid(0, sub);
        for slope in [Slope::Positive, Slope::Negative] {
            let (mut slope_hits, accounting) = detect_slope(grid, pol, slope, params.dadd_threshold, params.bad_band_cw_path_limit);
            for h in slope_hits.iter_mut() {
                h.start_bin += (sub * fft_len) as u32;
            }
            hits.extend(slope_hits);
            for (_, low, high) in accounting.bad_bands() {
                bad_bands.push(BadBandRecord {
                    pol,
                    resolution: Some(0),
                    low_hz: bin_to_hz((sub * fft_len) as f64 + low as f64, bin_width_hz).0,
                    high_hz: bin_to_hz((sub * fft_len) as f64 + high as f64 + 1.0, bin_width_hz).0,
                });
            }
        }
    }
    let gap_bins = params.cw_clustering_delta_freq_hz / bin_width_hz;
    cluster_hits(hits, gap_bins, bin_width_hz, observation_duration)
}

/// Merge both polarizations' pulse hits, slice the usable band into overlapping windows,
/// search each slice for triplets, and cluster accepted triplets into pulse trains,
/// converting each train into a [`SignalDescription`].
#[allow(clippy::too_many_arguments)]
fn run_pulse_detection(
    hits: Vec<PulseHit>,
    n_sub: usize,
    fft_len: usize,
    n_spectra: usize,
    bin_width_hz: f64,
    spectrum_period_s: f64,
    params: &ActivityParams,
    p_pulse: f64,
    triplet_threshold: f32,
    bad_bands: &mut BadBandRegistry,
) -> Vec<SignalDescription> {
    let merged = combine(&hits);
    let n_bins_total = (n_sub * fft_len) as u32;

    let max_drift_bins_per_spectrum = (params.max_drift_rate_tolerance_hz_per_s * spectrum_period_s / bin_width_hz).max(0.1);
    let overlap_bins = ((max_drift_bins_per_spectrum * n_spectra as f64).ceil() as u32).clamp(1, n_bins_total);
    let bins_per_slice = n_bins_total.min(4096);
    let slices = make_slices(n_bins_total, bins_per_slice, overlap_bins);

    let triplet_params = TripletParams {
        max_drift_bins_per_spectrum,
        max_diff_bins: params.max_diff_bins,
        max_diff_spectra: params.max_diff_spectra,
        triplet_threshold,
        min_spectral_gap: 1,
    };
    let max_triplets = params.bad_band_pulse_triplet_limit.max(0.0).round() as u32;
    let max_pulses = params.bad_band_pulse_limit.max(0.0).round() as u32;

    let mut triplets: Vec<Triplet> = Vec::new();
    for slice in &slices {
        let mut slice_pulses: Vec<PulseHit> = merged.iter().copied().filter(|h| h.bin >= slice.bin_low && h.bin < slice.bin_high).collect();
        slice_pulses.sort_by_key(|h| h.spectrum);
        let (mut found, bad) = search_slice(&slice_pulses, &triplet_params, max_triplets, max_pulses);
        if bad {
            bad_bands.push(BadBandRecord {
                pol: PolKind::Both,
                resolution: Some(0),
                low_hz: bin_to_hz(slice.bin_low as f64, bin_width_hz).0,
                high_hz: bin_to_hz(slice.bin_high as f64, bin_width_hz).0,
            });
        }
        triplets.append(&mut found);
    }

    let cluster_range_bins = params.pulse_clustering_delta_freq_hz / bin_width_hz;
    let trains = cluster_triplets(triplets, cluster_range_bins, n_bins_total, n_spectra as u32, p_pulse, params.per_resolution.pulse_threshold[0]);

    let mut signals: Vec<SignalDescription> =
        trains.into_iter().map(|t| pulse_train_to_signal(&t, bin_width_hz, spectrum_period_s)).collect();
    signals.sort_by(|a, b| a.freq.0.partial_cmp(&b.freq.0).unwrap());
    signals
}

fn pulse_train_to_signal(train: &PulseTrain, bin_width_hz: f64, spectrum_period_s: f64) -> SignalDescription {
    let pol = combine_pulse_pol(&train.pulses);
    let drift = drift_bins_to_rate(train.drift_per_spectrum, bin_width_hz, Seconds(spectrum_period_s));
    SignalDescription {
        freq: bin_to_hz(train.start_bin, bin_width_hz),
        drift,
        width: Hz(bin_width_hz),
        power: train.total_power,
        pol,
        kind: SignalKind::PulseTrain { period_s: train.period_spectra * spectrum_period_s, pulse_count: train.pulse_count },
    }
}

fn combine_pulse_pol(pulses: &[PulseHit]) -> PolKind {
    let (mut left, mut right, mut both) = (false, false, false);
    for p in pulses {
        match p.pol {
            PolKind::Left => left = true,
            PolKind::Right => right = true,
            PolKind::Both => both = true,
            PolKind::Mixed => {
                left = true;
                right = true;
            }
        }
    }
    if both || (left && right) {
        PolKind::Both
    }
    else if left {
        PolKind::Left
    }
    else if right {
        PolKind::Right
    }
    else {
        PolKind::Both
    }
}

/// Refine a CW super-cluster's description with the archive-channel coherent re-detector
///: synthesize a wider channel from the stored CD subchannels, run the
/// power-path search over a wide heterodyned channel to get each polarization's peak power
/// (which feeds the coherent search's apparent-SNR estimate), then de-drift/heterodyne a
/// narrow (~2 Hz) channel and run the coherent search per polarization.
#[allow(clippy::too_many_arguments)]
fn run_coherent_redetect(
    sc: &SuperCluster,
    cd_l: &CdGrid,
    cd_r: &CdGrid,
    n_sub: usize,
    subchannel_bandwidth_hz: f64,
    bin_width_hz: f64,
    params: &ActivityParams,
    archive_sink: &mut dyn ArchiveSink,
) -> Result<Option<CoherentOutcome>> {
    if n_sub < 2 {
        return Ok(None);
    }
    let strongest = &sc.strongest;
    let global_bin = (strongest.freq.0 / bin_width_hz).max(0.0);
    let center_sub = ((global_bin as usize) / fft_len_from_bin_width(subchannel_bandwidth_hz, bin_width_hz)).min(n_sub - 1);

    let n_ac = if n_sub >= 4 { 4 } else { 2 };
    let (lo, hi) = subchannel_window(center_sub, n_ac, n_sub);
    let actual_n_ac = hi - lo;
    if actual_n_ac < 2 || !actual_n_ac.is_power_of_two() {
        return Ok(None);
    }

    let fft_ac = Fft::new(actual_n_ac);
    let subs_l: Vec<Vec<Complex>> = (lo..hi).map(|s| decode_cd(cd_l.half_frame(s, 0))).collect();
    let subs_r: Vec<Vec<Complex>> = (lo..hi).map(|s| decode_cd(cd_r.half_frame(s, 0))).collect();
    let archive_l = synthesize(&subs_l, &fft_ac)?;
    let archive_r = synthesize(&subs_r, &fft_ac)?;
    archive_sink.write_samples(&serialize_archive(&archive_l));

    let ac_bandwidth_hz = actual_n_ac as f64 * subchannel_bandwidth_hz;

    let p_star_l = power_search_peak(&archive_l, ac_bandwidth_hz, strongest.drift.0, sc.id, PolKind::Left).map(|p| p.power as f64).unwrap_or(0.0);
    let p_star_r = power_search_peak(&archive_r, ac_bandwidth_hz, strongest.drift.0, sc.id, PolKind::Right).map(|p| p.power as f64).unwrap_or(0.0);

    let spb = samples_per_block(ac_bandwidth_hz, 2.0);
    let mut narrow_l = archive_l;
    let mut narrow_r = archive_r;
    de_drift(&mut narrow_l, 1.0 / ac_bandwidth_hz, 0.0, strongest.drift.0, ac_bandwidth_hz);
    de_drift(&mut narrow_r, 1.0 / ac_bandwidth_hz, 0.0, strongest.drift.0, ac_bandwidth_hz);
    let sig_l = heterodyne(&narrow_l, spb);
    let sig_r = heterodyne(&narrow_r, spb);

    let m = largest_pow2_leq(sig_l.len().min(sig_r.len()));
    if m < 2 {
        return Ok(None);
    }
    let fft_m = Fft::new(m);
    let widths = [1usize, 2, 4];
    let narrow_bandwidth_hz = ac_bandwidth_hz / spb as f64;
    let coherent_bin_hz = narrow_bandwidth_hz / m as f64;
    let result_l: CoherentResult = coherent::run(&sig_l, m, 2, &widths, 0, m, &fft_m, PolKind::Left, p_star_l, bin_width_hz, coherent_bin_hz)?;
    let result_r: CoherentResult = coherent::run(&sig_r, m, 2, &widths, 0, m, &fft_m, PolKind::Right, p_star_r, bin_width_hz, coherent_bin_hz)?;
    let combined = seti_archive::combine_polarizations(result_l, result_r, params.cw_coherent_threshold);

    Ok(Some(CoherentOutcome { pfa: combined.pfa, snr: combined.snr, pfa_threshold: params.cw_coherent_threshold }))
}

fn fft_len_from_bin_width(subchannel_bandwidth_hz: f64, bin_width_hz: f64) -> usize {
    let ratio = (subchannel_bandwidth_hz / bin_width_hz).round().max(1.0) as usize;
    ratio.next_power_of_two().max(1)
}

fn decode_cd(samples: &[seti_core::grids::CdSample]) -> Vec<Complex> {
    samples.iter().map(|s| {
        let (re, im) = s.to_f32();
        Complex::new(re, im)
    }).collect()
}

fn serialize_archive(samples: &[Complex]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 8);
    for s in samples {
        out.extend_from_slice(&s.re.to_le_bytes());
        out.extend_from_slice(&s.im.to_le_bytes());
    }
    out
}

/// Run the power-path search over a coarsely heterodyned copy of the archive channel and
/// return its peak, whose power feeds the coherent search's apparent-SNR estimate for this
/// polarization. Returns `None` when there aren't enough archive samples for even one
/// spectrum; the coherent search still proceeds, just without a power-path contribution to
/// its SNR.
fn power_search_peak(archive_channel: &[Complex], ac_bandwidth_hz: f64, drift_hz_per_s: f64, cluster_id: u64, pol: PolKind) -> Option<PowerPeak> {
    let spb = samples_per_block(ac_bandwidth_hz, 10.0);
    let mut wide = archive_channel.to_vec();
    de_drift(&mut wide, 1.0 / ac_bandwidth_hz, 0.0, drift_hz_per_s, ac_bandwidth_hz);
    let wide = heterodyne(&wide, spb);

    let n_bins = largest_pow2_leq(wide.len().min(16));
    if n_bins < 2 {
        return None;
    }
    let hop = n_bins / 2;
    let mut n_spectra = 1usize;
    while n_bins + hop * (n_spectra * 2 - 1) <= wide.len() {
        n_spectra *= 2;
    }
    if n_spectra < 1 {
        return None;
    }
    let fft = Fft::new(n_bins);
    match synthesize_spectra(&wide, n_bins, n_spectra, &fft) {
        Ok(spectra) => {
            let power = to_power(&spectra);
            let peak = search(&power, n_bins, n_spectra);
            debug!(
                "power-search peak for super-cluster {} ({:?}): bin={} drift_bins={} power={:.1}",
                cluster_id, pol, peak.bin, peak.drift_bins, peak.power
            );
            Some(peak)
        }
        Err(_) => {
            debug!("super-cluster {} ({:?}): not enough archive samples for a power search", cluster_id, pol);
            None
        }
    }
}

fn largest_pow2_leq(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut p = 1usize;
    while p * 2 <= n {
        p *= 2;
    }
    p
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use seti_core::packet::{SampleI16, SamplePacket};
    use seti_proto::packet_header::encode_packet;

    use super::*;

    /// Write a capture file of `n_packets` back-to-back wire-format packets per
    /// polarization, each carrying `samples_per_packet` complex-int16 noise samples.
    fn write_capture_file(path: &std::path::Path, n_packets: u32, samples_per_packet: usize) {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut file = std::fs::File::create(path).unwrap();
        for seq in 0..n_packets {
            for pol in [PolKind::Left, PolKind::Right] {
                let samples: Vec<SampleI16> = (0..samples_per_packet)
                    .map(|_| SampleI16 { re: rng.random_range(-50..50), im: rng.random_range(-50..50) })
                    .collect();
                let pkt = SamplePacket { seq, abs_time: seq as f64, pol, source_id: 1, channel_id: 1, valid: true, samples };
                let bytes = encode_packet(&pkt, 1, 0);
                file.write_all(&bytes).unwrap();
            }
        }
    }

    fn base_cli(capture: std::path::PathBuf) -> Cli {
        Cli {
            capture,
            coeff_file: None,
            n_sub: 4,
            overlap: 1,
            samples_per_chan: 8,
            subchannel_bandwidth_hz: 1000.0,
            data_collection_frames: 1,
            dadd_threshold: 7.0,
            zero_drift_tolerance: 0.01,
            max_drift_rate_tolerance: 50.0,
            max_candidates: 100,
            probe_only: false,
            verbose: 0,
        }
    }

    /// Pure-noise capture runs the whole pipeline (DFB through classification) without
    /// error and does not panic, even though no candidates are expected to survive.
    #[test]
    fn pure_noise_capture_runs_end_to_end() {
        let path = std::env::temp_dir().join(format!("seti-pipeline-test-{}-noise.cap", std::process::id()));
        write_capture_file(&path, 8, 50);
        let cli = base_cli(path.clone());
        let result = run(&cli);
        std::fs::remove_file(&path).ok();
        assert!(result.is_ok(), "pipeline failed on pure-noise capture: {:?}", result.err());
    }

    #[test]
    fn probe_only_skips_detection() {
        let path = std::env::temp_dir().join(format!("seti-pipeline-test-{}-probe.cap", std::process::id()));
        write_capture_file(&path, 8, 50);
        let mut cli = base_cli(path.clone());
        cli.probe_only = true;
        let result = run(&cli);
        std::fs::remove_file(&path).ok();
        assert!(result.is_ok());
    }

    #[test]
    fn dropped_packet_pair_is_tolerated() {
        let path = std::env::temp_dir().join(format!("seti-pipeline-test-{}-gap.cap", std::process::id()));
        let mut rng = SmallRng::seed_from_u64(7);
        let mut file = std::fs::File::create(&path).unwrap();
        for seq in 0..8u32 {
            if seq == 3 {
                // Drop both polarizations' packet for this sequence number; the
                // assembler must substitute zero-filled packets and keep going.
                continue;
            }
            for pol in [PolKind::Left, PolKind::Right] {
                let samples: Vec<SampleI16> =
                    (0..50).map(|_| SampleI16 { re: rng.random_range(-50..50), im: rng.random_range(-50..50) }).collect();
                let pkt = SamplePacket { seq, abs_time: seq as f64, pol, source_id: 1, channel_id: 1, valid: true, samples };
                file.write_all(&encode_packet(&pkt, 1, 0)).unwrap();
            }
        }
        drop(file);
        let cli = base_cli(path.clone());
        let result = run(&cli);
        std::fs::remove_file(&path).ok();
        assert!(result.is_ok(), "pipeline failed on a capture with a dropped packet pair: {:?}", result.err());
    }

    #[test]
    fn empty_capture_is_a_configuration_error_not_a_panic() {
        let path = std::env::temp_dir().join(format!("seti-pipeline-test-{}-empty.cap", std::process::id()));
        std::fs::File::create(&path).unwrap();
        let cli = base_cli(path.clone());
        let result = run(&cli);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
