#![feature(test)]
extern crate test;

use std::sync::Arc;

use byteorder::{ByteOrder, LE};
use test::Bencher;

use spinscan::{Calibration, ChannelCorrection, Decoder, Model16, Model32, SensorConfiguration, SensorModel};

fn calibration<S: SensorModel>(n_channels: usize) -> Arc<Calibration> {
    let channels: Vec<ChannelCorrection> = (0..n_channels)
        .map(|i| ChannelCorrection { vert_correction: (i as f32 - n_channels as f32 / 2.0) * 0.01, ..Default::default() })
        .collect();
    Arc::new(Calibration::from_channels(n_channels as u32, 0.004, channels).unwrap())
}

fn synth_packet<S: SensorModel>(azimuth_deg: f32) -> Vec<u8> {
    const HEADER_SIZE: usize = 8;
    const AZIMUTH_SIZE: usize = 2;
    const UNIT_SIZE: usize = 3;
    let block_size = AZIMUTH_SIZE + S::N_CHANNELS * UNIT_SIZE;
    let mut buf = vec![0u8; S::PACKET_SIZE];
    let raw_az = (azimuth_deg * 100.0) as u16;
    for block_id in 0..S::N_BLOCKS {
        let o = HEADER_SIZE + block_id * block_size;
        LE::write_u16(&mut buf[o..o + 2], raw_az);
        for ch in 0..S::N_CHANNELS {
            let u = o + AZIMUTH_SIZE + ch * UNIT_SIZE;
            LE::write_u16(&mut buf[u..u + 2], 1000);
            buf[u + 2] = 100;
        }
    }
    let tail = HEADER_SIZE + S::N_BLOCKS * block_size;
    LE::write_u32(&mut buf[tail..tail + 4], 1);
    LE::write_u32(&mut buf[tail + 4..tail + 8], 0);
    buf[tail + 8] = 0x37;
    buf[tail + 9] = 0x37;
    buf
}

#[bench]
fn bench_push_packet_model16(b: &mut Bencher) {
    let config = SensorConfiguration::new(0.2, 150.0, 0.0, 360.0, 0.0, 0.01);
    let mut decoder: Decoder<Model16> = Decoder::new(config, calibration::<Model16>(Model16::N_CHANNELS));
    let packet = synth_packet::<Model16>(10.0);

    b.iter(|| {
        let last_azimuth = decoder.push_packet(&packet);
        test::black_box(last_azimuth);
    });
}

#[bench]
fn bench_push_packet_model32(b: &mut Bencher) {
    let config = SensorConfiguration::new(0.2, 200.0, 0.0, 360.0, 0.0, 0.01);
    let mut decoder: Decoder<Model32> = Decoder::new(config, calibration::<Model32>(Model32::N_CHANNELS));
    let packet = synth_packet::<Model32>(10.0);

    b.iter(|| {
        let last_azimuth = decoder.push_packet(&packet);
        test::black_box(last_azimuth);
    });
}
