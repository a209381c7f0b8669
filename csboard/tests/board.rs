use csboard::{BOARD_1, BOARD_2, Channel, ControlBoard, Error, Polarity};
use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

const MUX: u8 = 0x70;
const DAC: u8 = 0x47;
const EXPANDER: u8 = 0x20;
const ADC: u8 = 0x48;
const OLAT: u8 = 0x0A;

/// ADS7828 command bytes for inputs 0-5 with the reference and converter on.
const ADC_COMMANDS: [u8; 6] = [0x8C, 0xCC, 0x9C, 0xDC, 0xAC, 0xEC];

fn select(line: u8) -> I2cTransaction {
    I2cTransaction::write(MUX, vec![1 << line])
}

/// Read-modify-write of the expander latch.
fn latch_update(before: u8, after: u8) -> Vec<I2cTransaction> {
    vec![
        I2cTransaction::write_read(EXPANDER, vec![OLAT], vec![before]),
        I2cTransaction::write(EXPANDER, vec![OLAT, after]),
    ]
}

fn begin_transactions() -> Vec<I2cTransaction> {
    (1..=4)
        .flat_map(|line| {
            [
                select(line),
                I2cTransaction::write(EXPANDER, vec![0x00, 0x00]),
                I2cTransaction::write(EXPANDER, vec![OLAT, 0x00]),
            ]
        })
        .collect()
}

/// Transactions for one sampling cycle where `reading(module, pass, input)`
/// supplies each conversion result.
fn sampling_transactions(reading: impl Fn(u8, usize, usize) -> u16) -> Vec<I2cTransaction> {
    let mut out = Vec::new();
    for module in 1..=4u8 {
        out.push(select(module));
        for pass in 0..5 {
            for (input, command) in ADC_COMMANDS.iter().enumerate() {
                let value = reading(module, pass, input);
                out.push(I2cTransaction::write_read(
                    ADC,
                    vec![*command],
                    value.to_be_bytes().to_vec(),
                ));
            }
        }
    }
    out
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn begin_initialises_every_module() {
    let i2c = I2cMock::new(&begin_transactions());
    let mut board = ControlBoard::new(i2c, BOARD_1);
    board.begin().unwrap();
    assert_eq!(board.current_commands(), &[0.0; 8]);
    board.release().done();
}

#[test]
fn negative_current_on_channel_three() {
    let mut expectations = vec![select(2)];
    // SWP (3) high, SWN (2) high, MUXP (4) low, MUXN (7) high.
    expectations.extend(latch_update(0x00, 0x08));
    expectations.extend(latch_update(0x08, 0x0C));
    expectations.extend(latch_update(0x0C, 0x0C));
    expectations.extend(latch_update(0x0C, 0x8C));
    // Code 100 on DAC output 6.
    expectations.push(I2cTransaction::write(DAC, vec![0x36, 0x06, 0x40]));

    let mut board = ControlBoard::new(I2cMock::new(&expectations), BOARD_1);
    board.set_current(3, -0.5).unwrap();
    assert_eq!(board.current_commands()[3], -0.5);
    board.release().done();
}

#[test]
fn positive_current_leaves_other_pair_alone() {
    // Channel 4 is pair 0 of module 3. Pair 1's pins (2, 3, 4, 7) stay as read.
    let mut expectations = vec![select(3)];
    expectations.extend(latch_update(0x8C, 0x8E)); // SWP (1) high
    expectations.extend(latch_update(0x8E, 0x8F)); // SWN (0) high
    expectations.extend(latch_update(0x8F, 0xCF)); // MUXP (6) high
    expectations.extend(latch_update(0xCF, 0xCF)); // MUXN (5) low
    // round(2.0 * 200) = 400 = 0x190 on DAC output 1.
    expectations.push(I2cTransaction::write(DAC, vec![0x31, 0x19, 0x00]));

    let mut board = ControlBoard::new(I2cMock::new(&expectations), BOARD_1);
    board.set_current(4, 2.0).unwrap();
    board.release().done();
}

#[test]
fn zero_current_switches_channel_off() {
    let mut expectations = vec![select(1)];
    expectations.extend(latch_update(0x63, 0x61)); // SWP (1) low
    expectations.extend(latch_update(0x61, 0x60)); // SWN (0) low
    expectations.extend(latch_update(0x60, 0x20)); // MUXP (6) low
    expectations.extend(latch_update(0x20, 0x00)); // MUXN (5) low
    expectations.push(I2cTransaction::write(DAC, vec![0x30, 0x00, 0x00]));

    let mut board = ControlBoard::new(I2cMock::new(&expectations), BOARD_1);
    board.set_current(0, 0.0).unwrap();
    assert_eq!(board.current_commands()[0], 0.0);
    board.release().done();
}

#[test]
fn out_of_range_channel_touches_nothing() {
    let mut board = ControlBoard::new(I2cMock::new(&[]), BOARD_1);
    assert_eq!(board.set_current(8, 1.0), Err(Error::ChannelOutOfRange(8)));
    assert_eq!(
        board.set_current(255, -1.0),
        Err(Error::ChannelOutOfRange(255))
    );
    assert_eq!(board.current_commands(), &[0.0; 8]);
    board.release().done();
}

#[test]
fn oversized_current_saturates_dac() {
    let mut expectations = vec![select(4)];
    expectations.extend(latch_update(0x00, 0x08));
    expectations.extend(latch_update(0x08, 0x0C));
    expectations.extend(latch_update(0x0C, 0x1C));
    expectations.extend(latch_update(0x1C, 0x1C));
    expectations.push(I2cTransaction::write(DAC, vec![0x37, 0xFF, 0xF0]));

    let mut board = ControlBoard::new(I2cMock::new(&expectations), BOARD_1);
    board.set_current(7, 30.0).unwrap();
    assert_eq!(board.current_commands()[7], 30.0);
    board.release().done();
}

#[test]
fn polarity_reads_back_from_latch() {
    let channel = Channel::new(3).unwrap();
    let expectations = [
        select(2),
        I2cTransaction::write_read(EXPANDER, vec![OLAT], vec![0x8C]),
        select(2),
        I2cTransaction::write_read(EXPANDER, vec![OLAT], vec![0x08]),
    ];
    let mut board = ControlBoard::new(I2cMock::new(&expectations), BOARD_1);
    assert_eq!(board.polarity(channel).unwrap(), Some(Polarity::Negative));
    assert_eq!(board.polarity(channel).unwrap(), None);
    board.release().done();
}

#[test]
fn read_adc_validates_before_selecting() {
    let mut board = ControlBoard::new(I2cMock::new(&[]), BOARD_1);
    assert_eq!(board.read_adc(0, 0), Err(Error::ModuleOutOfRange(0)));
    assert_eq!(board.read_adc(5, 0), Err(Error::ModuleOutOfRange(5)));
    assert_eq!(board.read_adc(1, 8), Err(Error::AdcChannelOutOfRange(8)));
    board.release().done();
}

#[test]
fn read_adc_uses_power_down_mode_from_begin() {
    // Power-down bits are 0b00 until `begin` turns the reference on.
    let mut expectations = vec![
        select(4),
        I2cTransaction::write_read(ADC, vec![0xF0], vec![0x07, 0xFF]),
    ];
    expectations.extend(begin_transactions());
    expectations.extend([
        select(4),
        I2cTransaction::write_read(ADC, vec![0xFC], vec![0xF8, 0x01]),
    ]);
    let mut board = ControlBoard::new(I2cMock::new(&expectations), BOARD_1);
    assert_eq!(board.read_adc(4, 7).unwrap(), 0x07FF);
    board.begin().unwrap();
    assert_eq!(board.read_adc(4, 7).unwrap(), 0x0801);
    board.release().done();
}

#[test]
fn update_all_averages_and_calibrates() {
    let mut expectations = begin_transactions();
    expectations.extend(sampling_transactions(|module, pass, input| {
        match (module, input) {
            // Module 1: channel 0 negative, channel 1 positive.
            (1, 0) | (1, 1) => 164,
            (1, 2) => 0,
            (1, 3) => 164,
            (1, 4) => 164,
            (1, 5) => 0,
            // Module 2, input 2: 100, 100, 101, 101, 101 averages to 101.
            (2, 2) => 100 + u16::from(pass >= 2),
            _ => 0,
        }
    }));

    let mut board = ControlBoard::new(I2cMock::new(&expectations), BOARD_1);
    board.begin().unwrap();
    board.update_all().unwrap();

    assert_eq!(board.raw_adc()[0], [164, 164, 0, 164, 164, 0]);
    assert_eq!(board.raw_adc()[1], [0, 0, 101, 0, 0, 0]);

    let sense = 164.0 / 4096.0 * 25.0;
    let v = board.voltages();
    let i = board.currents();
    assert!(approx(v[0], -sense));
    assert!(approx(v[1], sense));
    assert!(approx(i[0], -(sense + 0.03)));
    assert!(approx(i[1], sense - 0.13));
    assert!(approx(v[2], 101.0 / 4096.0 * 25.0));
    // Zero voltage counts as positive, leaving just the offset.
    assert!(approx(i[3], -0.13));
    assert!(approx(i[4], 0.06));
    board.release().done();
}

#[test]
fn calibration_follows_config() {
    let mut expectations = begin_transactions();
    expectations.extend(sampling_transactions(|_, _, _| 0));
    let mut board = ControlBoard::new(I2cMock::new(&expectations), BOARD_2);
    board.begin().unwrap();
    board.update_all().unwrap();
    assert_eq!(board.currents(), &BOARD_2.calibration_offsets_ma);
    board.release().done();
}

#[test]
fn bus_error_stops_sampling_cycle() {
    let mut expectations = vec![select(1)];
    expectations.push(
        I2cTransaction::write_read(ADC, vec![0x80], vec![0x00, 0x00])
            .with_error(ErrorKind::Other),
    );
    let mut board = ControlBoard::new(I2cMock::new(&expectations), BOARD_1);
    assert_eq!(board.update_all(), Err(Error::Bus(ErrorKind::Other)));
    assert_eq!(board.voltages(), &[0.0; 8]);
    board.release().done();
}
